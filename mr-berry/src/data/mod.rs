use std::ops::{Index, IndexMut};
use std::path::Path;

use ndarray::{Array3, ArrayView, ArrayViewMut, Axis, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::{Idx2d, Idx3d};

pub mod slice;

pub use slice::{ImgWriteRaw, ImgWriteVis, LabelSlice, LabelSliceMut, ScanSlice, ScanSliceMut};

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 打开 3D 体数据错误.
#[derive(Debug)]
pub enum OpenVolumeError {
    /// 底层 nifti 读取错误.
    Nifti(nifti::NiftiError),

    /// 数据不是三维的, 或形状与 header 不符.
    Shape(ndarray::ShapeError),
}

impl From<nifti::NiftiError> for OpenVolumeError {
    #[inline]
    fn from(value: nifti::NiftiError) -> Self {
        Self::Nifti(value)
    }
}

impl From<ndarray::ShapeError> for OpenVolumeError {
    #[inline]
    fn from(value: ndarray::ShapeError) -> Self {
        Self::Shape(value)
    }
}

/// 从 header 读取 (矢状, 冠状, 轴向) 三维形状.
///
/// 本 crate **不做轴重排**: 三个解剖平面都是一等公民,
/// 统一按照 nifti 原生 `(sagittal, coronal, axial)` 顺序访问.
#[inline]
fn shape_from_header(h: &NiftiHeader) -> Idx3d {
    let [_, i, j, k, ..] = h.dim;
    (i as usize, j as usize, k as usize)
}

/// 构造一个形状/分辨率自洽的合成 header. 仅用于实验与测试场景.
fn synthetic_header((i, j, k): Idx3d, pix_dim: [f32; 3], tag: &[u8; 4]) -> BoxedHeader {
    let mut header = Box::<NiftiHeader>::default();
    header.dim = [3, i as u16, j as u16, k as u16, 1, 1, 1, 1];
    let [pi, pj, pk] = pix_dim;
    header.pixdim[1] = pi;
    header.pixdim[2] = pj;
    header.pixdim[3] = pk;
    header.intent_name[..4].copy_from_slice(tag);
    header
}

/// 3D 体数据 header 的共用属性和部分通用操作.
pub trait VolumeMeta {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取数据形状大小, 按 (矢状, 冠状, 轴向) 排列.
    #[inline]
    fn shape(&self) -> Idx3d {
        shape_from_header(self.header())
    }

    /// 获取轴向切片形状大小.
    #[inline]
    fn axial_slice_shape(&self) -> Idx2d {
        let (i, j, _) = self.shape();
        (i, j)
    }

    /// 获取轴向切片个数.
    #[inline]
    fn len_axial(&self) -> usize {
        self.shape().2
    }

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (i, j, k) = self.shape();
        i * j * k
    }

    /// 检查索引是否合法.
    #[inline]
    fn check(&self, (i0, j0, k0): &Idx3d) -> bool {
        let (i, j, k) = self.shape();
        *i0 < i && *j0 < j && *k0 < k
    }

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 按
    /// (矢状, 冠状, 轴向) 排列.
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, i, j, k, ..] = self.header().pixdim;
        [i as f64, j as f64, k as f64]
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.pix_dim().iter().product()
    }

    /// 体素分辨率在三个维度上是否是各向同的?
    #[inline]
    fn is_isotropic(&self) -> bool {
        let [i, j, k] = self.pix_dim();
        i == j && i == k
    }
}

/// nii 格式 3D 脑部 MRI 扫描, 包括 header 和强度数据. 强度值以 `f32` 保存.
///
/// 一经载入即视为不可变: 读者只能获得视图或副本,
/// 替换整个扫描是唯一合法的 "修改" 方式 (见 [`crate::VolumeStore`]).
#[derive(Debug, Clone)]
pub struct MriScan {
    header: BoxedHeader,
    data: Array3<f32>,
}

impl VolumeMeta for MriScan {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Index<Idx3d> for MriScan {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx3d> for MriScan {
    #[inline]
    fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl MriScan {
    /// 打开 nii 文件格式的 3D MRI 扫描. `path` 为 nii 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OpenVolumeError> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());

        // (矢状, 冠状, 轴向), 即 nifti 原生 [d1, d2, d3].
        let data = obj
            .into_volume()
            .into_ndarray::<f32>()?
            .into_dimensionality::<Ix3>()?;

        // 统一为行优先布局, 便于后续切片迭代.
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert_eq!(data.dim(), shape_from_header(&header));

        Ok(Self { header, data })
    }

    /// 根据裸强度数据和体素分辨率直接创建 `MriScan` 实体.
    ///
    /// # 参数
    ///
    /// 1. `data` 按照 (矢状, 冠状, 轴向) 格式存储.
    /// 2. `pix_dim` 按照 (矢状, 冠状, 轴向) 格式存储, 以毫米为单位.
    ///
    /// # 注意
    ///
    /// 该方法生成的 header 仅包含形状与分辨率信息,
    /// 因此你应仅将其用于实验目的.
    pub fn from_parts(data: Array3<f32>, pix_dim: [f32; 3]) -> Self {
        let header = synthetic_header(data.dim(), pix_dim, b"synt");
        Self { header, data }
    }

    /// 判断该结构是否是由 `from_parts` 手动拼接的.
    pub fn is_synthetic(&self) -> bool {
        self.header.intent_name.starts_with(b"synt")
    }

    /// 获取轴向 (z 方向) 第 `k_index` 层切片视图.
    ///
    /// 当 `k_index` 越界时 panic.
    #[inline]
    pub fn axial_slice_at(&self, k_index: usize) -> ScanSlice<'_> {
        ScanSlice::new(self.data.index_axis(Axis(2), k_index))
    }

    /// 获取轴向 (z 方向) 第 `k_index` 层可变切片视图.
    ///
    /// 当 `k_index` 越界时 panic.
    #[inline]
    pub fn axial_slice_at_mut(&mut self, k_index: usize) -> ScanSliceMut<'_> {
        ScanSliceMut::new(self.data.index_axis_mut(Axis(2), k_index))
    }

    /// 获取能按升序迭代轴向不可变切片的迭代器.
    #[inline]
    pub fn axial_slice_iter(&self) -> impl ExactSizeIterator<Item = ScanSlice> {
        self.data.axis_iter(Axis(2)).map(ScanSlice::new)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f32, Ix3> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut<'_, f32, Ix3> {
        self.data.view_mut()
    }

    /// 返回首个非有限 (NaN/inf) 体素的下标. 数据全部有限时返回 `None`.
    pub fn first_non_finite(&self) -> Option<Idx3d> {
        self.data
            .indexed_iter()
            .find_map(|(pos, v)| (!v.is_finite()).then_some(pos))
    }

    /// 计算由 `it` 给出的所有索引对应强度值的平均值.
    ///
    /// 如果存在越界索引, 则程序 panic.
    pub fn mean_intensity<I: IntoIterator<Item = Idx3d>>(&self, it: I) -> f64 {
        let mut count = 0u64;
        let mut acc = 0.0;
        for pos in it.into_iter() {
            count += 1;
            acc += self[pos] as f64;
        }
        acc / (count as f64)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl MriScan {
    /// 借助 `rayon`, 并行地对每个轴向不可变切片实施 `op` 操作.
    pub fn par_for_each_axial_slice<F>(&self, op: F)
    where
        F: Fn(ScanSlice) + Sync + Send,
    {
        self.data()
            .axis_iter(Axis(2))
            .into_par_iter()
            .for_each(|v| {
                op(ScanSlice::new(v));
            });
    }

    /// 借助 `rayon`, 并行地对每个轴向不可变切片实施 `op` 操作.
    /// 该操作会同时携带轴向索引信息.
    pub fn par_for_each_indexed_axial_slice<F>(&self, op: F)
    where
        F: Fn(usize, ScanSlice) + Sync + Send,
    {
        self.data()
            .axis_iter(Axis(2))
            .into_par_iter()
            .enumerate()
            .for_each(|(k, v)| {
                op(k, ScanSlice::new(v));
            });
    }
}

/// 3D 肿瘤标注体, 包括 header 和标签数据. 标签值以 `u8` 保存,
/// 含义见 [`crate::consts::gray`].
///
/// 该结构仅由分割引擎产生 (或从 nii 文件载入以便复核).
/// 其平面分辨率为模型输入分辨率 (默认 128×128) 而非源扫描的原生分辨率,
/// 调用方 **不得** 假设其形状与源扫描在三个轴上都一致;
/// 仅轴向切片个数与源扫描保持相同.
#[derive(Debug, Clone)]
pub struct TumorLabel {
    header: BoxedHeader,
    data: Array3<u8>,
}

impl VolumeMeta for TumorLabel {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Index<Idx3d> for TumorLabel {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx3d> for TumorLabel {
    #[inline]
    fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl TumorLabel {
    /// 打开 nii 文件格式的 3D 标注 (如数据集真值标签, 用于复核).
    /// `path` 为 nii 文件的本地路径. 如果打开成功, 则返回 `Ok(Self)`,
    /// 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OpenVolumeError> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());

        let data = obj
            .into_volume()
            .into_ndarray::<u8>()?
            .into_dimensionality::<Ix3>()?;
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert_eq!(data.dim(), shape_from_header(&header));

        Ok(Self { header, data })
    }

    /// 从源扫描 header 派生标注体. 分割引擎在组装好标签数据后调用.
    ///
    /// `data` 按照 (平面高, 平面宽, 轴向) 格式存储. 平面分辨率为模型输入
    /// 分辨率, 因此派生 header 的平面 pixdim 会按照源平面实际物理尺寸
    /// 等比缩放, 轴向 pixdim 保持不变.
    pub(crate) fn derived_from(src: &NiftiHeader, data: Array3<u8>) -> Self {
        let (si, sj, _) = shape_from_header(src);
        let (di, dj, dk) = data.dim();

        let mut header = Box::new(src.clone());
        header.dim = [3, di as u16, dj as u16, dk as u16, 1, 1, 1, 1];
        if di != 0 && dj != 0 {
            header.pixdim[1] *= si as f32 / di as f32;
            header.pixdim[2] *= sj as f32 / dj as f32;
        }
        header.intent_name[..4].copy_from_slice(b"mseg");
        Self { header, data }
    }

    /// 根据裸标签数据和体素分辨率直接创建 `TumorLabel` 实体.
    ///
    /// # 参数
    ///
    /// 1. `data` 按照 (平面高, 平面宽, 轴向) 格式存储, 像素值必须为
    ///    0, 1, 2 或 3, 否则部分可视化操作会 panic.
    /// 2. `pix_dim` 按照 (矢状, 冠状, 轴向) 格式存储, 以毫米为单位.
    ///
    /// # 注意
    ///
    /// 该方法可能会创建不一致的实体, 因此你应仅将其用于实验目的.
    pub fn from_parts(data: Array3<u8>, pix_dim: [f32; 3]) -> Self {
        let header = synthetic_header(data.dim(), pix_dim, b"synt");
        Self { header, data }
    }

    /// 判断该结构是否是分割引擎派生的.
    pub fn is_derived(&self) -> bool {
        self.header.intent_name.starts_with(b"mseg")
    }

    /// 获取轴向第 `k_index` 层不可变切片.
    ///
    /// 当 `k_index` 越界时 panic.
    #[inline]
    pub fn axial_slice_at(&self, k_index: usize) -> LabelSlice {
        LabelSlice::new(self.data.index_axis(Axis(2), k_index))
    }

    /// 获取轴向第 `k_index` 层可变切片.
    ///
    /// 当 `k_index` 越界时 panic.
    #[inline]
    pub fn axial_slice_at_mut(&mut self, k_index: usize) -> LabelSliceMut {
        LabelSliceMut::new(self.data.index_axis_mut(Axis(2), k_index))
    }

    /// 获取能按升序迭代轴向不可变切片的迭代器.
    #[inline]
    pub fn axial_slice_iter(&self) -> impl ExactSizeIterator<Item = LabelSlice> {
        self.data.axis_iter(Axis(2)).map(LabelSlice::new)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u8, Ix3> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut<'_, u8, Ix3> {
        self.data.view_mut()
    }

    /// 获取标注体中值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }

    /// 获取标注体的基本统计信息.
    ///
    /// 统计信息格式为: \[背景, 坏死核心, 水肿, 增强肿瘤\] 体素数.
    /// 该操作不会统计任何其他像素信息.
    pub fn numeric_statistics(&self) -> [usize; crate::consts::SEG_CLASSES] {
        let mut ans = [0; crate::consts::SEG_CLASSES];
        let len = ans.len();
        for pixel in self.data.iter().filter(|p| (**p as usize) < len) {
            ans[*pixel as usize] += 1;
        }
        ans
    }

    /// 将标注体中值为 `old` 的体素全部替换为 `new`.
    ///
    /// 返回总共成功替换的个数.
    pub fn replace(&mut self, old: u8, new: u8) -> usize {
        let mut cnt = 0usize;
        self.data_mut()
            .iter_mut()
            .filter(|pix| **pix == old)
            .for_each(|p| {
                cnt += 1;
                *p = new;
            });
        cnt
    }

    /// 将标签数据按原样导出为 `.npy` 文件.
    #[inline]
    pub fn export_npy<P: AsRef<Path>>(&self, path: P) -> Result<(), ndarray_npy::WriteNpyError> {
        ndarray_npy::write_npy(path, &self.data)
    }
}
