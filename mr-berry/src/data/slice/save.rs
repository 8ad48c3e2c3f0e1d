//! 图像的持久化存储.

use crate::{LabelSlice, LabelSliceMut, ScanSlice, ScanSliceMut};
use image::ImageResult;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// `ImgWriteVis` trait 的意图是, 图像将以 "可视化友好"
/// 的方式保存, 而不是 "as is" 的方式. 这意味着, 对于 `LabelSlice`, `LabelSliceMut`
/// 这类仅存在 0, 1, 2, 3 像素值的图像, 在保存时会映射到肉眼较易能区分的形式;
/// 对于 `ScanSlice`, `ScanSliceMut` 这类以原始强度存储的扫描,
/// 在保存时会按切片 min-max 映射到 8-bit 灰度.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以通过 **按原样** 模式持久化存储的图像对象.
///
/// `ImgWriteRaw` trait 的额外意图是, 图像将按原样保存. 这意味着,
/// 对于 `LabelSlice`, `LabelSliceMut` 这类图像可以直接存储为灰度图像,
/// 但面对 `ScanSlice`, `ScanSliceMut` 这类以原始强度存储的扫描无能为力.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 使像素更有利于单通道可视化.
#[inline]
pub(crate) fn pretty(label: u8) -> u8 {
    use crate::consts::gray::*;
    match label {
        // 背景为黑色
        BRATS_BACKGROUND => BLACK,

        // 水肿为灰色
        BRATS_EDEMA => GRAY,

        // 让坏死核心颜色更接近增强肿瘤颜色
        BRATS_NECROTIC => LIGHT_GRAY,

        // 增强肿瘤为白色
        BRATS_ENHANCING => WHITE,

        any_else => panic!("只允许图像存在 0, 1, 2, 3 像素, 但发现了 `{any_else}`"),
    }
}

macro_rules! impl_label_vis {
    ($($slice: ty),+) => {
        $(
            /// 会将背景/水肿/坏死核心/增强肿瘤像素分别映射为黑色/灰色/亮灰色/白色. 不允许其他颜色.
            impl ImgWriteVis for $slice {
                fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.shape();
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    for ((h, w), &pix) in self.indexed_iter() {
                        buf.put_pixel(w as u32, h as u32, image::Luma([pretty(pix)]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

macro_rules! impl_label_raw {
    ($($slice: ty),+) => {
        $(
            /// 按原样存储.
            impl ImgWriteRaw for $slice {
                fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.shape();
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    for ((h, w), &pix) in self.indexed_iter() {
                        buf.put_pixel(w as u32, h as u32, image::Luma([pix]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

macro_rules! impl_scan_vis {
    ($($scan: ty),+) => {
        $(
            /// 按切片 min-max 线性映射到 \[0, 255\] 灰度. 常数切片映射为全黑.
            impl ImgWriteVis for $scan {
                fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.shape();
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    let (lo, hi) = self.min_max().unwrap_or((0.0, 0.0));
                    let span = hi - lo;
                    for ((h, w), &v) in self.indexed_iter() {
                        let gray = if span > 0.0 {
                            ((v - lo) / span * 255.0) as u8
                        } else {
                            crate::consts::gray::BLACK
                        };
                        buf.put_pixel(w as u32, h as u32, image::Luma([gray]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

impl_label_vis!(LabelSlice<'_>, LabelSliceMut<'_>);
impl_scan_vis!(ScanSlice<'_>, ScanSliceMut<'_>);
impl_label_raw!(LabelSlice<'_>, LabelSliceMut<'_>);
