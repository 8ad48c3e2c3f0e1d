//! 三个解剖平面的切片提取.
//!
//! 本模块是纯函数集合: 给定体数据视图、平面与下标, 返回对应的二维切片.
//! 显示层的翻转/转置约定不属于这里, 提取结果保持其余两轴的自然顺序.

use crate::Idx3d;
use ndarray::{Array2, ArrayView2, ArrayView3, Axis};
use std::ops::Range;

/// 解剖观察轴. 依次对应体数据的第 0, 1, 2 轴.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViewAxis {
    /// 矢状面 (左右方向).
    Sagittal,

    /// 冠状面 (前后方向).
    Coronal,

    /// 轴状面 (上下方向).
    Axial,
}

impl ViewAxis {
    /// 三个观察轴, 按体数据轴序排列.
    pub const ALL: [ViewAxis; 3] = [Self::Sagittal, Self::Coronal, Self::Axial];

    /// 对应的 ndarray 轴下标.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Sagittal => 0,
            Self::Coronal => 1,
            Self::Axial => 2,
        }
    }

    /// 对应的 ndarray 轴.
    #[inline]
    pub const fn nd(self) -> Axis {
        Axis(self.index())
    }

    /// 英文轴名. 可用于拼接输出文件名.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sagittal => "sagittal",
            Self::Coronal => "coronal",
            Self::Axial => "axial",
        }
    }
}

/// 切片下标越界错误.
///
/// 下标类型为 `usize`, 因此负下标在类型层面即不可表示;
/// 该错误只覆盖 `index >= len` 的情况.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RangeError {
    /// 请求的观察轴.
    pub axis: ViewAxis,

    /// 请求的下标.
    pub index: usize,

    /// 该轴的实际长度.
    pub len: usize,
}

/// 获取将 `axis` 固定在 `index` 处的二维切片视图.
/// 其余两轴保持自然顺序.
///
/// 当 `index >= len(axis)` 时返回 [`RangeError`].
pub fn slice_view<T>(
    volume: ArrayView3<'_, T>,
    axis: ViewAxis,
    index: usize,
) -> Result<ArrayView2<'_, T>, RangeError> {
    let len = volume.len_of(axis.nd());
    if index >= len {
        return Err(RangeError { axis, index, len });
    }
    Ok(volume.index_axis_move(axis.nd(), index))
}

/// 获取将 `axis` 固定在 `index` 处的二维切片深拷贝.
///
/// 当 `index >= len(axis)` 时返回 [`RangeError`].
#[inline]
pub fn extract<T: Clone>(
    volume: ArrayView3<'_, T>,
    axis: ViewAxis,
    index: usize,
) -> Result<Array2<T>, RangeError> {
    slice_view(volume, axis, index).map(|v| v.to_owned())
}

/// 新数据载入后, `axis` 轴的默认展示下标: `len(axis) / 2` (向下取整).
#[inline]
pub fn default_index<T>(volume: &ArrayView3<'_, T>, axis: ViewAxis) -> usize {
    volume.len_of(axis.nd()) / 2
}

/// 三个轴的默认展示下标, 按 (矢状, 冠状, 轴向) 排列.
#[inline]
pub fn default_indices<T>(volume: &ArrayView3<'_, T>) -> Idx3d {
    (
        default_index(volume, ViewAxis::Sagittal),
        default_index(volume, ViewAxis::Coronal),
        default_index(volume, ViewAxis::Axial),
    )
}

/// `axis` 轴的合法下标区间. 用于设置显示层滑块的边界.
#[inline]
pub fn index_range<T>(volume: &ArrayView3<'_, T>, axis: ViewAxis) -> Range<usize> {
    0..volume.len_of(axis.nd())
}

#[cfg(test)]
mod tests {
    use super::{default_index, default_indices, extract, index_range, slice_view, ViewAxis};
    use ndarray::Array3;

    fn numbered(i: usize, j: usize, k: usize) -> Array3<f32> {
        // 体素值编码自身下标, 便于核对提取结果.
        Array3::from_shape_fn((i, j, k), |(a, b, c)| (a * 100 + b * 10 + c) as f32)
    }

    /// 默认下标律: `extract(V, A, len(A) / 2)` 与手工固定该下标所得切片一致.
    #[test]
    fn test_default_index_law() {
        let v = numbered(4, 6, 8);
        assert_eq!(default_indices(&v.view()), (2, 3, 4));

        for axis in ViewAxis::ALL {
            let mid = default_index(&v.view(), axis);
            let got = extract(v.view(), axis, mid).unwrap();
            for ((r, c), &val) in got.indexed_iter() {
                let expected = match axis {
                    ViewAxis::Sagittal => v[(mid, r, c)],
                    ViewAxis::Coronal => v[(r, mid, c)],
                    ViewAxis::Axial => v[(r, c, mid)],
                };
                assert_eq!(val, expected);
            }
        }
    }

    #[test]
    fn test_slice_shapes() {
        let v = numbered(4, 6, 8);
        let view = v.view();
        assert_eq!(slice_view(view, ViewAxis::Sagittal, 0).unwrap().dim(), (6, 8));
        assert_eq!(slice_view(view, ViewAxis::Coronal, 0).unwrap().dim(), (4, 8));
        assert_eq!(slice_view(view, ViewAxis::Axial, 0).unwrap().dim(), (4, 6));
    }

    /// 下标等于轴长时必须报 `RangeError`.
    #[test]
    fn test_out_of_range() {
        let v = numbered(4, 6, 8);
        for (axis, len) in ViewAxis::ALL.into_iter().zip([4usize, 6, 8]) {
            let err = extract(v.view(), axis, len).unwrap_err();
            assert_eq!(err.axis, axis);
            assert_eq!(err.index, len);
            assert_eq!(err.len, len);

            assert!(extract(v.view(), axis, len - 1).is_ok());
            assert!(extract(v.view(), axis, usize::MAX).is_err());
        }
    }

    #[test]
    fn test_index_range() {
        let v = numbered(4, 6, 8);
        assert_eq!(index_range(&v.view(), ViewAxis::Coronal), 0..6);
    }
}
