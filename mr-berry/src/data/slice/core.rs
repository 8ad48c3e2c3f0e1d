use crate::Idx2d;
use itertools::Itertools;
use ndarray::iter::{IndexedIter, Iter, IterMut};
use ndarray::{Array2, ArrayView2, ArrayViewMut2, Ix2};
use ordered_float::OrderedFloat;
use std::ops::{Index, IndexMut};

/// 不可变、借用的二维 MRI 标注切片.
pub struct LabelSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::TumorLabel`].
    ///
    /// 这里有意把代码写死为 `ArrayView` 降低灵活性, 但使结构的意图更加明确.
    data: ArrayView2<'a, u8>,
}

/// 可变、借用的二维 MRI 标注切片.
pub struct LabelSliceMut<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::TumorLabel`].
    data: ArrayViewMut2<'a, u8>,
}

/// 不可变、借用的二维 MRI 强度切片.
pub struct ScanSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::MriScan`].
    data: ArrayView2<'a, f32>,
}

/// 可变、借用的二维 MRI 强度切片.
pub struct ScanSliceMut<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::MriScan`].
    data: ArrayViewMut2<'a, f32>,
}

/// 不可变方法集合.
macro_rules! impl_slice_immut {
    ($life: lifetime, $slice: ty, $array: ty, $elem: ty) => {
        impl<$life> $slice {
            /// 直接初始化.
            #[inline]
            pub(crate) fn new(data: $array) -> Self {
                Self { data }
            }

            /// 获得 **底层** 数据的一份不可变 shallow copy.
            #[inline]
            pub fn array_view(&self) -> ArrayView2<$elem> {
                self.data.view()
            }

            /// 获取可以迭代切片像素的迭代器.
            #[inline]
            pub fn iter(&self) -> Iter<'_, $elem, Ix2> {
                self.data.iter()
            }

            /// 获取可以按 (下标, 像素) 迭代切片的迭代器.
            #[inline]
            pub fn indexed_iter(&self) -> IndexedIter<'_, $elem, Ix2> {
                self.data.indexed_iter()
            }

            /// 获取给定位置的像素值. 越界时返回 `None`.
            #[inline]
            pub fn get(&self, pos: Idx2d) -> Option<&$elem> {
                self.data.get(pos)
            }

            /// 获取切片形状.
            #[inline]
            pub fn shape(&self) -> Idx2d {
                self.data.dim()
            }

            /// 获取切片像素个数.
            #[inline]
            pub fn size(&self) -> usize {
                self.data.len()
            }

            /// 获得一份拥有所有权的深拷贝.
            #[inline]
            pub fn to_owned_array(&self) -> Array2<$elem> {
                self.data.to_owned()
            }
        }

        impl<$life> Index<Idx2d> for $slice {
            type Output = $elem;

            #[inline]
            fn index(&self, index: Idx2d) -> &Self::Output {
                &self.data[index]
            }
        }
    };
}

impl_slice_immut!('a, LabelSlice<'a>, ArrayView2<'a, u8>, u8);
impl_slice_immut!('a, LabelSliceMut<'a>, ArrayViewMut2<'a, u8>, u8);
impl_slice_immut!('a, ScanSlice<'a>, ArrayView2<'a, f32>, f32);
impl_slice_immut!('a, ScanSliceMut<'a>, ArrayViewMut2<'a, f32>, f32);

/// 可变方法集合.
macro_rules! impl_slice_mut {
    ($slice: ty, $elem: ty) => {
        impl $slice {
            /// 获得 **底层** 数据的一份可变 shallow copy.
            #[inline]
            pub fn array_view_mut(&mut self) -> ArrayViewMut2<$elem> {
                self.data.view_mut()
            }

            /// 获取可以迭代并修改切片像素的迭代器.
            #[inline]
            pub fn iter_mut(&mut self) -> IterMut<'_, $elem, Ix2> {
                self.data.iter_mut()
            }

            /// 获取给定位置的像素值, 并可就地修改. 越界时返回 `None`.
            #[inline]
            pub fn get_mut(&mut self, pos: Idx2d) -> Option<&mut $elem> {
                self.data.get_mut(pos)
            }
        }
    };
}

impl_slice_mut!(LabelSliceMut<'_>, u8);
impl_slice_mut!(ScanSliceMut<'_>, f32);

/// 强度切片专有方法.
macro_rules! impl_scan_minmax {
    ($($slice: ty),+) => {
        $(
            impl $slice {
                /// 获取切片强度的 (最小值, 最大值). 空切片返回 `None`.
                ///
                /// 若切片存在 NaN, 则顺序未定义; 调用方应先保证数据有限.
                pub fn min_max(&self) -> Option<(f32, f32)> {
                    self.iter()
                        .copied()
                        .map(OrderedFloat)
                        .minmax()
                        .into_option()
                        .map(|(lo, hi)| (lo.0, hi.0))
                }
            }
        )+
    };
}

impl_scan_minmax!(ScanSlice<'_>, ScanSliceMut<'_>);

#[cfg(test)]
mod tests {
    use crate::MriScan;
    use ndarray::Array3;

    #[test]
    fn test_scan_slice_min_max() {
        let mut data = Array3::<f32>::zeros((3, 4, 2));
        data[(0, 0, 1)] = -7.5;
        data[(2, 3, 1)] = 42.0;
        let scan = MriScan::from_parts(data, [1.0; 3]);

        assert_eq!(scan.axial_slice_at(0).min_max(), Some((0.0, 0.0)));
        assert_eq!(scan.axial_slice_at(1).min_max(), Some((-7.5, 42.0)));
    }

    #[test]
    fn test_scan_slice_access() {
        let mut data = Array3::<f32>::zeros((3, 4, 2));
        data[(1, 2, 0)] = 9.0;
        let scan = MriScan::from_parts(data, [1.0; 3]);
        let sl = scan.axial_slice_at(0);

        assert_eq!(sl.shape(), (3, 4));
        assert_eq!(sl.size(), 12);
        assert_eq!(sl[(1, 2)], 9.0);
        assert_eq!(sl.get((3, 0)), None);
        assert_eq!(sl.to_owned_array()[(1, 2)], 9.0);
    }
}
