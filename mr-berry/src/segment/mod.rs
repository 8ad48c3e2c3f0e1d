//! 体数据分割引擎.
//!
//! 流水线分两个阶段: 可取消、可观察的逐切片预处理
//! (归一化 + 重采样, 各切片相互独立), 以及一次原子的批量推理.
//! 取消只作用于第一阶段: 推理一旦发出就运行到结束.
//!
//! 引擎自身不持有调用间的可变状态, 仅由模型引用和目标分辨率参数化;
//! 失败时不产生任何部分结果, [`crate::VolumeStore`] 中的旧数据保持原样.

mod error;
mod model;
mod preprocess;

pub use error::SegmentError;
pub use model::{ModelError, TumorModel};
pub use preprocess::{min_max_normalize, resize_to_square};

use crate::consts::{MODEL_INPUT_SIZE, NORM_EPS, SEG_CLASSES};
use crate::data::{MriScan, TumorLabel, VolumeMeta};
use ndarray::{s, Array2, Array3, Array4, ArrayView2, ArrayView4, Axis};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 协同取消标记. 可克隆后跨线程共享.
///
/// 分割引擎在每处理完一个切片后检查一次该标记,
/// 并在发出推理调用前最后检查一次.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// 创建未触发的标记.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消.
    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// 是否已请求取消.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// 分割引擎. 持有模型与目标输入分辨率, 本身无任何调用间状态.
pub struct SegEngine<M> {
    model: M,
    input_size: usize,
}

impl<M: TumorModel> SegEngine<M> {
    /// 以默认输入分辨率 ([`MODEL_INPUT_SIZE`]) 创建引擎.
    #[inline]
    pub fn new(model: M) -> Self {
        Self::with_input_size(model, MODEL_INPUT_SIZE)
    }

    /// 以指定的正方形输入边长创建引擎. `input_size` 必须为正.
    pub fn with_input_size(model: M, input_size: usize) -> Self {
        assert_ne!(input_size, 0, "模型输入边长必须为正");
        Self { model, input_size }
    }

    /// 获取底层模型引用.
    #[inline]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// 目标输入分辨率 (正方形边长).
    #[inline]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// 对整个扫描运行分割, 不带取消与进度观察.
    #[inline]
    pub fn segment(&self, scan: &MriScan) -> Result<TumorLabel, SegmentError> {
        self.segment_with(scan, &CancelFlag::new(), |_, _| {})
    }

    /// 对整个扫描运行分割.
    ///
    /// 每预处理完一个轴向切片, 调用一次 `progress(已完成数, 总数)`,
    /// 并检查一次 `cancel`; 若在推理发出前检测到取消,
    /// 返回 [`SegmentError::Cancelled`] 且不构造任何部分结果.
    pub fn segment_with<F>(
        &self,
        scan: &MriScan,
        cancel: &CancelFlag,
        mut progress: F,
    ) -> Result<TumorLabel, SegmentError>
    where
        F: FnMut(usize, usize),
    {
        let n = validate(scan)?;
        let side = self.input_size;

        let mut batch = Array4::<f32>::zeros((n, side, side, 1));
        for (k, sl) in scan.axial_slice_iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(SegmentError::Cancelled);
            }
            let plane = preprocessed_plane(sl.array_view(), side);
            batch.slice_mut(s![k, .., .., 0]).assign(&plane);
            progress(k + 1, n);
        }
        if cancel.is_cancelled() {
            return Err(SegmentError::Cancelled);
        }

        self.infer_and_reduce(scan, batch)
    }

    /// 推理 + 归约阶段. 两种预处理路径共用.
    fn infer_and_reduce(
        &self,
        scan: &MriScan,
        batch: Array4<f32>,
    ) -> Result<TumorLabel, SegmentError> {
        let (n, side) = (batch.dim().0, self.input_size);
        let probs = self.model.predict(batch.view())?;

        let expected = [n, side, side, SEG_CLASSES];
        if probs.dim() != (n, side, side, SEG_CLASSES) {
            return Err(ModelError::BadOutputShape(expected, probs.shape().to_vec()).into());
        }

        let labels = reduce_argmax(probs.view());
        Ok(TumorLabel::derived_from(scan.header(), labels))
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use ndarray::parallel::prelude::*;
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl<M: TumorModel> SegEngine<M> {
    /// 借助 `rayon`, 并行地预处理各轴向切片, 然后照常推理.
    ///
    /// 取消语义与 [`Self::segment_with`] 相同: 每个切片任务开始前检查
    /// 一次标记, 合流后、推理发出前再检查一次. 并行路径不提供逐切片进度.
    pub fn par_segment(
        &self,
        scan: &MriScan,
        cancel: &CancelFlag,
    ) -> Result<TumorLabel, SegmentError> {
        let n = validate(scan)?;
        let side = self.input_size;

        let mut batch = Array4::<f32>::zeros((n, side, side, 1));
        let data = scan.data();
        batch
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(k, mut plane)| {
                if cancel.is_cancelled() {
                    return;
                }
                let sl = data.index_axis(Axis(2), k);
                plane
                    .index_axis_mut(Axis(2), 0)
                    .assign(&preprocessed_plane(sl, side));
            });
        if cancel.is_cancelled() {
            return Err(SegmentError::Cancelled);
        }

        self.infer_and_reduce(scan, batch)
    }
}

/// 检查扫描适于分割: 三个轴长度均为正, 且数据全部有限.
/// 成功时返回轴向切片个数.
fn validate(scan: &MriScan) -> Result<usize, SegmentError> {
    let (i, j, k) = scan.shape();
    if i == 0 || j == 0 || k == 0 {
        return Err(SegmentError::EmptyVolume);
    }
    if let Some(pos) = scan.first_non_finite() {
        return Err(SegmentError::NonFiniteSample(pos));
    }
    Ok(k)
}

/// 单切片预处理: 归一化后重采样到正方形.
#[inline]
fn preprocessed_plane(sl: ArrayView2<'_, f32>, size: usize) -> Array2<f32> {
    let norm = min_max_normalize(sl, NORM_EPS);
    resize_to_square(norm.view(), size)
}

/// 将 `(N, H, W, C)` 概率体逐像素归约为类别下标, 组装为
/// `(H, W, N)` 标签体. 概率并列时取较小的类别下标.
fn reduce_argmax(probs: ArrayView4<'_, f32>) -> Array3<u8> {
    let (n, h, w, _) = probs.dim();
    let mut labels = Array3::<u8>::zeros((h, w, n));
    for k in 0..n {
        let plane = probs.index_axis(Axis(0), k);
        for r in 0..h {
            for c in 0..w {
                let pixel = plane.slice(s![r, c, ..]);
                let mut best = 0usize;
                let mut best_p = pixel[0];
                for (cls, &p) in pixel.iter().enumerate().skip(1) {
                    // 严格大于: 并列时保留较小类别.
                    if p > best_p {
                        best = cls;
                        best_p = p;
                    }
                }
                labels[(r, c, k)] = best as u8;
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::{CancelFlag, ModelError, SegEngine, SegmentError, TumorModel};
    use crate::consts::gray::*;
    use crate::consts::SEG_CLASSES;
    use crate::data::{MriScan, VolumeMeta};
    use crate::store::VolumeStore;
    use ndarray::{Array3, Array4, ArrayView4, Axis};

    /// 测试桩: 全零输入时背景通道概率最高, 非零像素判为水肿.
    struct BackgroundFavoring;

    impl TumorModel for BackgroundFavoring {
        fn predict(&self, batch: ArrayView4<'_, f32>) -> Result<Array4<f32>, ModelError> {
            let (n, h, w, _) = batch.dim();
            let mut out = Array4::<f32>::zeros((n, h, w, SEG_CLASSES));
            for ((k, r, c, _), &v) in batch.indexed_iter() {
                if v == 0.0 {
                    out[(k, r, c, BRATS_BACKGROUND as usize)] = 0.9;
                } else {
                    out[(k, r, c, BRATS_EDEMA as usize)] = 0.9;
                }
            }
            Ok(out)
        }
    }

    /// 测试桩: 输出全零概率 (四个通道全部并列).
    struct AllTies;

    impl TumorModel for AllTies {
        fn predict(&self, batch: ArrayView4<'_, f32>) -> Result<Array4<f32>, ModelError> {
            let (n, h, w, _) = batch.dim();
            Ok(Array4::zeros((n, h, w, SEG_CLASSES)))
        }
    }

    /// 测试桩: 输出形状错误.
    struct WrongShape;

    impl TumorModel for WrongShape {
        fn predict(&self, batch: ArrayView4<'_, f32>) -> Result<Array4<f32>, ModelError> {
            let (n, h, w, _) = batch.dim();
            Ok(Array4::zeros((n, h, w, SEG_CLASSES + 1)))
        }
    }

    /// 测试桩: 后端失败.
    struct Failing;

    impl TumorModel for Failing {
        fn predict(&self, _: ArrayView4<'_, f32>) -> Result<Array4<f32>, ModelError> {
            Err(ModelError::Backend("session lost".into()))
        }
    }

    fn small_scan(value: f32) -> MriScan {
        MriScan::from_parts(Array3::from_elem((6, 6, 4), value), [1.0; 3])
    }

    /// 全背景律: 对全零体数据, 偏向背景通道的模型产出全背景标注.
    #[test]
    fn test_all_background_segmentation() {
        let engine = SegEngine::with_input_size(BackgroundFavoring, 16);
        let label = engine.segment(&small_scan(0.0)).unwrap();

        assert!(label.is_derived());
        assert_eq!(label.shape(), (16, 16, 4));
        assert_eq!(label.count(BRATS_BACKGROUND), 16 * 16 * 4);
    }

    /// 标注体的轴向切片数与源一致, 平面分辨率为模型输入分辨率.
    #[test]
    fn test_label_shape_contract() {
        let engine = SegEngine::with_input_size(AllTies, 32);
        let scan = small_scan(1.0);
        let label = engine.segment(&scan).unwrap();

        assert_eq!(label.len_axial(), scan.len_axial());
        assert_eq!(label.axial_slice_shape(), (32, 32));
    }

    /// 概率并列时取最小类别下标.
    #[test]
    fn test_argmax_tie_breaking() {
        let engine = SegEngine::with_input_size(AllTies, 8);
        let label = engine.segment(&small_scan(7.0)).unwrap();
        assert_eq!(label.count(BRATS_BACKGROUND), 8 * 8 * 4);
    }

    #[test]
    fn test_progress_reported_per_slice() {
        let engine = SegEngine::with_input_size(BackgroundFavoring, 8);
        let mut seen = Vec::new();
        engine
            .segment_with(&small_scan(0.0), &CancelFlag::new(), |done, total| {
                seen.push((done, total));
            })
            .unwrap();
        assert_eq!(seen, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
    }

    /// 预先取消: 不发出推理, 存储中的旧扫描原样保留.
    #[test]
    fn test_cancel_before_inference() {
        let engine = SegEngine::with_input_size(Failing, 8);

        let mut store = VolumeStore::new();
        store.set_scan(small_scan(2.0));

        let cancel = CancelFlag::new();
        cancel.cancel();

        // 模型是 `Failing`: 如果推理被错误地发出, 错误种类会是 Inference.
        let err = engine
            .segment_with(store.scan().unwrap(), &cancel, |_, _| {})
            .unwrap_err();
        assert!(matches!(err, SegmentError::Cancelled));

        assert!(store.label().is_none());
        assert_eq!(store.scan().unwrap()[(0, 0, 0)], 2.0);
    }

    #[test]
    fn test_model_failure_kinds() {
        let scan = small_scan(1.0);

        let err = SegEngine::with_input_size(Failing, 8)
            .segment(&scan)
            .unwrap_err();
        assert!(matches!(
            err,
            SegmentError::Inference(ModelError::Backend(_))
        ));

        let err = SegEngine::with_input_size(WrongShape, 8)
            .segment(&scan)
            .unwrap_err();
        assert!(matches!(
            err,
            SegmentError::Inference(ModelError::BadOutputShape(..))
        ));
    }

    #[test]
    fn test_invalid_volume_kinds() {
        let engine = SegEngine::with_input_size(BackgroundFavoring, 8);

        let mut scan = small_scan(1.0);
        scan[(2, 3, 1)] = f32::INFINITY;
        let err = engine.segment(&scan).unwrap_err();
        assert!(matches!(err, SegmentError::NonFiniteSample((2, 3, 1))));

        let empty = MriScan::from_parts(Array3::zeros((6, 6, 0)), [1.0; 3]);
        let err = engine.segment(&empty).unwrap_err();
        assert!(matches!(err, SegmentError::EmptyVolume));
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_par_segment_matches_sequential() {
        let mut data = Array3::<f32>::zeros((6, 6, 4));
        data.index_axis_mut(Axis(2), 2).fill(900.0);
        data[(1, 1, 0)] = 50.0;
        let scan = MriScan::from_parts(data, [1.0; 3]);

        let engine = SegEngine::with_input_size(BackgroundFavoring, 16);
        let seq = engine.segment(&scan).unwrap();
        let par = engine.par_segment(&scan, &CancelFlag::new()).unwrap();
        assert_eq!(seq.data(), par.data());
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_par_segment_cancel() {
        let engine = SegEngine::with_input_size(Failing, 8);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = engine.par_segment(&small_scan(1.0), &cancel).unwrap_err();
        assert!(matches!(err, SegmentError::Cancelled));
    }
}
