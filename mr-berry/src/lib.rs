#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 提供 BraTS 格式脑部 MRI nii 文件的结构化信息,
//! 以及肿瘤分割与体渲染流水线的全部数值部分.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 目前主要负责处理 BraTS 模式的数据, 没有对其它源的数据
//!    进行直接适配 (但如果新数据按照 BraTS 模式进行组织, 也可以工作).
//! 2. 界面 (窗口布局, 文件对话框, 画布, 报告排版) 与分类网络的训练/推理
//!    后端均不属于本 crate: 前者作为外部协作方调用这里的纯函数,
//!    后者通过 [`segment::TumorModel`] trait 以黑盒形式接入.
//! 3. 在非期望情况下, 程序会直接 panic, 而不会导致内存错误.
//!    As what Rust promises.
//!
//! # 流水线总览
//!
//! ```text
//! loader -> VolumeStore -> view (三平面切片) -> 外部画布
//!                       -> segment (逐切片预处理 + 一次批量推理) -> TumorLabel
//!                       -> render (RGBA 半透明体) -> 外部体渲染器
//!                       -> report (代表性切片导出)
//! ```
//!
//! ### 三平面切片提取 ✅
//!
//! 矢状/冠状/轴状三个解剖平面的纯函数切片, 默认下标与滑块区间规则.
//!
//! 实现位于 `mr-berry/src/view.rs`.
//!
//! ### 分割引擎 ✅
//!
//! 两阶段流水线: 可取消、可观察的逐切片预处理
//! (min-max 归一化 + 双线性重采样到 128×128),
//! 紧随其后的一次原子批量推理与逐像素 argmax 归约.
//!
//! 实现位于 `mr-berry/src/segment`.
//!
//! ### 半透明体渲染变换 ✅
//!
//! 阈值钳制, 冠状镜像, 矢状前半裁剪, RGBA 化与坐标轴标记线.
//!
//! 实现位于 `mr-berry/src/render.rs`.
//!
//! ### 会话体数据容器 ✅
//!
//! 取代原型中的进程级可变全局量, 单写者, 整体替换.
//!
//! 实现位于 `mr-berry/src/store.rs`.
//!
//! ### 切片持久化与报告导出 ✅
//!
//! PNG 落盘 (可视化友好/按原样两种模式), 代表性轴向切片选取.
//!
//! 实现位于 `mr-berry/src/data/slice/save.rs` 与 `mr-berry/src/report.rs`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 3D 脑部 MRI nii 文件基础数据结构.
mod data;

pub use data::{
    ImgWriteRaw, ImgWriteVis, LabelSlice, LabelSliceMut, MriScan, OpenVolumeError, ScanSlice,
    ScanSliceMut, TumorLabel, VolumeMeta,
};

pub mod consts;

pub mod dataset;
pub mod prelude;
pub mod render;
pub mod report;
pub mod segment;
pub mod view;

mod store;

pub use store::VolumeStore;
