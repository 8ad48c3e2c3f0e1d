//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// BraTS 标注中, 背景 (无肿瘤) 的像素值.
    pub const BRATS_BACKGROUND: u8 = 0;

    /// BraTS 标注中, 坏死核心的像素值.
    pub const BRATS_NECROTIC: u8 = 1;

    /// BraTS 标注中, 瘤周水肿的像素值.
    pub const BRATS_EDEMA: u8 = 2;

    /// BraTS 标注中, 增强肿瘤的像素值.
    pub const BRATS_ENHANCING: u8 = 3;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道暗灰色.
    pub const DARK_GRAY: u8 = 0b_0100_0000;

    /// 单通道灰色.
    pub const GRAY: u8 = 0b_1000_0000;

    /// 单通道亮灰色.
    pub const LIGHT_GRAY: u8 = 0b_1100_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 像素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, BRATS_BACKGROUND)
    }

    /// 像素是否是坏死核心?
    #[inline]
    pub const fn is_necrotic(p: u8) -> bool {
        matches!(p, BRATS_NECROTIC)
    }

    /// 像素是否是水肿?
    #[inline]
    pub const fn is_edema(p: u8) -> bool {
        matches!(p, BRATS_EDEMA)
    }

    /// 像素是否是增强肿瘤?
    #[inline]
    pub const fn is_enhancing(p: u8) -> bool {
        matches!(p, BRATS_ENHANCING)
    }

    /// 像素是否属于肿瘤 (坏死核心/水肿/增强肿瘤之一)?
    #[inline]
    pub const fn is_tumor(p: u8) -> bool {
        matches!(p, BRATS_NECROTIC | BRATS_EDEMA | BRATS_ENHANCING)
    }
}

/// 分割类别总数 (背景 + 三种肿瘤组织).
pub const SEG_CLASSES: usize = 4;

/// BraTS 2020 训练集大小.
pub const BRATS_TRAINING_SET_LEN: u32 = 369;

/// 分割模型要求的正方形输入边长 (像素).
pub const MODEL_INPUT_SIZE: usize = 128;

/// 归一化除零保护项.
pub const NORM_EPS: f32 = 1e-8;

/// 体渲染默认强度下阈值.
pub const RENDER_THR_MIN: f32 = 1.0;

/// 体渲染默认强度上阈值.
pub const RENDER_THR_MAX: f32 = 2000.0;

/// 三条坐标轴标记线的长度 (体素).
pub const AXIS_MARKER_LEN: usize = 40;

/// RGBA 通道数.
pub const RGBA_CHANNELS: usize = 4;
