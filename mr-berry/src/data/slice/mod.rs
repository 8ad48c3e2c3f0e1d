//! MRI 扫描/标注切片对象的操作.

mod core;
mod save;

pub use core::{LabelSlice, LabelSliceMut, ScanSlice, ScanSliceMut};

pub use save::{ImgWriteRaw, ImgWriteVis};
