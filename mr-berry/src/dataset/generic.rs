//! 通用 MRI scan/label 数据加载器.
//!
//! 提供迭代器风格的数据集获取模式.

use crate::data::{MriScan, OpenVolumeError, TumorLabel};
use std::path::{Path, PathBuf};

/// 文件名构造器. 接受数据集索引数, 获得文件名.
pub type FilenameBuilder = fn(u32) -> String;

/// 从指定索引、路径、文件名构造器来创建通用的 MRI scans 加载器.
///
/// # 注意
///
/// 1. `path` 必须是目录, 否则程序 panic.
/// 2. `data` 的所有取值 `value` 必须在 `path` 下有形如 `builder(value)` 的 nifti
///    文件, 否则加载器在迭代时会返回 `Result::Err`.
pub fn scan_loader<I: IntoIterator<Item = u32>, P: AsRef<Path>>(
    data: I,
    path: P,
    builder: FilenameBuilder,
) -> ScanLoader {
    let path = path.as_ref().to_owned();
    assert!(path.is_dir());

    let mut data: Vec<u32> = data.into_iter().collect();
    data.reverse();

    ScanLoader {
        path,
        data_rev: data,
        builder,
    }
}

/// 3D MRI scans 数据加载器, 并在内部自动转换文件名.
pub struct ScanLoader {
    path: PathBuf,
    data_rev: Vec<u32>,
    builder: FilenameBuilder,
}

impl Iterator for ScanLoader {
    type Item = (u32, Result<MriScan, OpenVolumeError>);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.data_rev.pop()?;

        self.path.push((self.builder)(idx));
        let data = MriScan::open(self.path.as_path());
        self.path.pop();

        Some((idx, data))
    }
}

impl ExactSizeIterator for ScanLoader {
    #[inline]
    fn len(&self) -> usize {
        self.data_rev.len()
    }
}

/// 从指定索引、路径、文件名构造器来创建通用的真值标注加载器.
///
/// 约定与 [`scan_loader`] 相同.
pub fn label_loader<I: IntoIterator<Item = u32>, P: AsRef<Path>>(
    data: I,
    path: P,
    builder: FilenameBuilder,
) -> LabelLoader {
    let path = path.as_ref().to_owned();
    assert!(path.is_dir());

    let mut data: Vec<u32> = data.into_iter().collect();
    data.reverse();

    LabelLoader {
        path,
        data_rev: data,
        builder,
    }
}

/// 3D 真值标注数据加载器, 并在内部自动转换文件名.
pub struct LabelLoader {
    path: PathBuf,
    data_rev: Vec<u32>,
    builder: FilenameBuilder,
}

impl Iterator for LabelLoader {
    type Item = (u32, Result<TumorLabel, OpenVolumeError>);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.data_rev.pop()?;

        self.path.push((self.builder)(idx));
        let data = TumorLabel::open(self.path.as_path());
        self.path.pop();

        Some((idx, data))
    }
}

impl ExactSizeIterator for LabelLoader {
    #[inline]
    fn len(&self) -> usize {
        self.data_rev.len()
    }
}
