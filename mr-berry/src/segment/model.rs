//! 分类模型边界.
//!
//! 引擎把模型当作黑盒: 一次批量调用, 输入 `(N, H, W, 1)` 归一化图像,
//! 输出 `(N, H, W, C)` 逐像素类别概率. 训练与推理后端均不属于本 crate,
//! 下游按需实现该 trait (如 onnx/tensorflow 绑定或测试桩).

use ndarray::{Array4, ArrayView4};

/// 模型推理错误.
#[derive(Debug)]
pub enum ModelError {
    /// 推理后端调用失败. 参数为后端给出的原因.
    Backend(String),

    /// 模型输出形状不符合预期. 参数依次为期望形状和实际形状.
    BadOutputShape([usize; 4], Vec<usize>),
}

/// 逐像素肿瘤组织分类模型.
pub trait TumorModel {
    /// 对一批单通道图像做一次逐像素分类.
    ///
    /// `batch` 形状为 `(N, H, W, 1)`, 像素已归一化到 \[0, 1\].
    /// 成功时返回 `(N, H, W, C)` 概率体, `C` 为类别数
    /// (本领域为 [`crate::consts::SEG_CLASSES`]).
    ///
    /// 该调用是原子的: 一旦发出就运行到结束, 引擎不会在中途打断它.
    fn predict(&self, batch: ArrayView4<'_, f32>) -> Result<Array4<f32>, ModelError>;
}

impl<M: TumorModel + ?Sized> TumorModel for &M {
    #[inline]
    fn predict(&self, batch: ArrayView4<'_, f32>) -> Result<Array4<f32>, ModelError> {
        (**self).predict(batch)
    }
}
