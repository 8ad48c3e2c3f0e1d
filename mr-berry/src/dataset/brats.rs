//! BraTS 训练集的文件命名约定与加载器.
//!
//! BraTS 按病例目录组织, 每个病例含四个模态扫描与一个真值标注,
//! 文件名形如 `BraTS20_Training_001_flair.nii`. 这里假设所有文件
//! 已平铺到同一目录 (与常见的预处理脚本输出一致).

use super::generic::{self, LabelLoader, ScanLoader};
use crate::consts::BRATS_TRAINING_SET_LEN;
use std::path::Path;

/// FLAIR 模态文件名.
pub fn flair_filename(num: u32) -> String {
    format!("BraTS20_Training_{num:03}_flair.nii")
}

/// T1 模态文件名.
pub fn t1_filename(num: u32) -> String {
    format!("BraTS20_Training_{num:03}_t1.nii")
}

/// T1 增强模态文件名.
pub fn t1ce_filename(num: u32) -> String {
    format!("BraTS20_Training_{num:03}_t1ce.nii")
}

/// T2 模态文件名.
pub fn t2_filename(num: u32) -> String {
    format!("BraTS20_Training_{num:03}_t2.nii")
}

/// 真值标注文件名.
pub fn seg_filename(num: u32) -> String {
    format!("BraTS20_Training_{num:03}_seg.nii")
}

/// 创建覆盖整个训练集的 FLAIR 扫描加载器. `path` 必须是目录.
pub fn full_flair_loader<P: AsRef<Path>>(path: P) -> ScanLoader {
    generic::scan_loader(1..=BRATS_TRAINING_SET_LEN, path, flair_filename)
}

/// 创建覆盖给定病例索引的 FLAIR 扫描加载器. `path` 必须是目录.
pub fn flair_loader<I: IntoIterator<Item = u32>, P: AsRef<Path>>(data: I, path: P) -> ScanLoader {
    generic::scan_loader(data, path, flair_filename)
}

/// 创建覆盖整个训练集的真值标注加载器. `path` 必须是目录.
pub fn full_seg_loader<P: AsRef<Path>>(path: P) -> LabelLoader {
    generic::label_loader(1..=BRATS_TRAINING_SET_LEN, path, seg_filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_builders() {
        assert_eq!(flair_filename(1), "BraTS20_Training_001_flair.nii");
        assert_eq!(t1_filename(42), "BraTS20_Training_042_t1.nii");
        assert_eq!(t1ce_filename(42), "BraTS20_Training_042_t1ce.nii");
        assert_eq!(t2_filename(369), "BraTS20_Training_369_t2.nii");
        assert_eq!(seg_filename(7), "BraTS20_Training_007_seg.nii");
    }
}
