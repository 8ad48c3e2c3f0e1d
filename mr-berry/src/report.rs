//! 面向外部报告生成器的只读导出.
//!
//! 报告 (PDF 等) 的排版组装不属于本 crate; 这里只提供代表性切片的
//! 选取规则与 PNG 落盘, 供外部文档嵌入.

use crate::data::{ImgWriteVis, MriScan, VolumeMeta};
use image::ImageResult;
use std::path::{Path, PathBuf};

/// 代表性轴向切片下标: 中间, 四分之一, 四分之三.
///
/// `len_axial` 必须为正, 否则 panic.
#[inline]
pub fn representative_axial_indices(len_axial: usize) -> [usize; 3] {
    assert_ne!(len_axial, 0, "轴向切片数必须为正");
    [len_axial / 2, len_axial / 4, 3 * len_axial / 4]
}

/// 将扫描的三张代表性轴向切片以可视化友好模式存为 PNG.
///
/// 文件名形如 `axial_{k:03}.png`, 落在 `dir` 目录下 (目录必须已存在).
/// 返回按写入顺序排列的文件路径.
pub fn save_representative_slices<P: AsRef<Path>>(
    scan: &MriScan,
    dir: P,
) -> ImageResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut written = Vec::with_capacity(3);
    for k in representative_axial_indices(scan.len_axial()) {
        let path = dir.join(format!("axial_{k:03}.png"));
        scan.axial_slice_at(k).save(&path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::representative_axial_indices;

    #[test]
    fn test_representative_indices() {
        assert_eq!(representative_axial_indices(100), [50, 25, 75]);
        assert_eq!(representative_axial_indices(4), [2, 1, 3]);
        assert_eq!(representative_axial_indices(1), [0, 0, 0]);
    }

    #[test]
    #[should_panic]
    fn test_representative_indices_empty() {
        representative_axial_indices(0);
    }
}
