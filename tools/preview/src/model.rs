//! 简单阈值分类模型. 仅用于端到端演练流水线, 不代表任何真实网络.

use mr_berry::prelude::*;
use mr_berry::segment::ModelError;
use ndarray::{Array4, ArrayView4};

/// 按归一化强度做硬阈值分类:
/// 0 判为背景, (0, 0.25\] 判为水肿, (0.25, 0.75\] 判为坏死核心,
/// 其余判为增强肿瘤.
pub struct ThresholdModel;

impl TumorModel for ThresholdModel {
    fn predict(&self, batch: ArrayView4<'_, f32>) -> Result<Array4<f32>, ModelError> {
        let (n, h, w, _) = batch.dim();
        let mut out = Array4::<f32>::zeros((n, h, w, SEG_CLASSES));
        for ((k, r, c, _), &v) in batch.indexed_iter() {
            let class = if v == 0.0 {
                BRATS_BACKGROUND
            } else if v <= 0.25 {
                BRATS_EDEMA
            } else if v <= 0.75 {
                BRATS_NECROTIC
            } else {
                BRATS_ENHANCING
            };
            out[(k, r, c, class as usize)] = 1.0;
        }
        Ok(out)
    }
}
