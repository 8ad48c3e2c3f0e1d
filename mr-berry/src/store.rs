//! 当前会话的体数据容器.
//!
//! 原型系统把 "当前体数据" 散落在进程级可变全局量和界面控件属性里;
//! 这里改为由应用会话持有的显式容器: 单写者, 读者只拿共享引用.
//! 载入新扫描或一次分割完成都是整体替换, 对随后的读取而言是原子的.
//! 读者手里旧的视图/副本仍然安全, 因为体数据一经载入就不再原地修改.

use crate::data::{MriScan, TumorLabel};

/// 当前载入的扫描与其派生标注的单写者容器.
#[derive(Debug, Default)]
pub struct VolumeStore {
    scan: Option<MriScan>,
    label: Option<TumorLabel>,
}

impl VolumeStore {
    /// 创建空容器.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换当前扫描. 旧扫描连同其派生标注一并丢弃
    /// (标注只对产生它的那次扫描有意义).
    pub fn set_scan(&mut self, scan: MriScan) {
        self.scan = Some(scan);
        self.label = None;
    }

    /// 安装一次 **完整** 的分割结果.
    ///
    /// 分割引擎要么给出完整标注体, 要么报错
    /// (见 [`crate::segment::SegmentError`]); 失败路径不会调用本方法,
    /// 因此容器里永远不会出现部分/损坏的标注.
    #[inline]
    pub fn set_label(&mut self, label: TumorLabel) {
        self.label = Some(label);
    }

    /// 当前扫描的共享引用.
    #[inline]
    pub fn scan(&self) -> Option<&MriScan> {
        self.scan.as_ref()
    }

    /// 当前标注的共享引用.
    #[inline]
    pub fn label(&self) -> Option<&TumorLabel> {
        self.label.as_ref()
    }

    /// 是否已载入扫描.
    #[inline]
    pub fn has_scan(&self) -> bool {
        self.scan.is_some()
    }

    /// 取走当前扫描 (连同丢弃标注), 容器恢复为空.
    pub fn take_scan(&mut self) -> Option<MriScan> {
        self.label = None;
        self.scan.take()
    }

    /// 清空容器.
    pub fn clear(&mut self) {
        self.scan = None;
        self.label = None;
    }
}

#[cfg(test)]
mod tests {
    use super::VolumeStore;
    use crate::data::{MriScan, TumorLabel};
    use ndarray::Array3;

    fn scan(v: f32) -> MriScan {
        MriScan::from_parts(Array3::from_elem((2, 2, 2), v), [1.0; 3])
    }

    fn label() -> TumorLabel {
        TumorLabel::from_parts(Array3::zeros((2, 2, 2)), [1.0; 3])
    }

    #[test]
    fn test_store_lifecycle() {
        let mut store = VolumeStore::new();
        assert!(!store.has_scan());
        assert!(store.label().is_none());

        store.set_scan(scan(1.0));
        store.set_label(label());
        assert!(store.has_scan());
        assert!(store.label().is_some());

        // 替换扫描会丢弃陈旧标注.
        store.set_scan(scan(2.0));
        assert!(store.label().is_none());
        assert_eq!(store.scan().unwrap()[(0, 0, 0)], 2.0);

        let taken = store.take_scan().unwrap();
        assert_eq!(taken[(0, 0, 0)], 2.0);
        assert!(!store.has_scan());

        store.set_scan(scan(3.0));
        store.clear();
        assert!(!store.has_scan());
    }
}
