//! 半透明体渲染变换.
//!
//! 把强度体 (或标注体的 f32 视图) 变换为可直接交给体渲染器的
//! `(X/2, Y, Z, 4)` RGBA 字节体: 阈值钳制, 归一, 冠状轴镜像,
//! 矢状轴前半裁剪 (避免双侧解剖结构的对称重复渲染, 也约减一半开销),
//! 最后叠加三条坐标轴标记线.
//!
//! 标记线必须在阈值/归一之后叠加, 否则会被阈值衰减.

use crate::consts::{AXIS_MARKER_LEN, RENDER_THR_MAX, RENDER_THR_MIN, RGBA_CHANNELS};
use crate::Idx3d;
use ndarray::{Array4, ArrayView3, Axis};
use num::clamp;

/// 体渲染输入: RGBA 字节体, 形状 `(X/2, Y, Z, 4)`.
///
/// 每次显示请求都重新构造, 从不持久化.
pub type RenderVolume = Array4<u8>;

/// 渲染变换输入错误.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenderError {
    /// 输入体数据为空 (存在长度为零的轴).
    EmptyVolume,

    /// 输入体数据含非有限值 (NaN/inf). 参数为首个坏体素的下标.
    NonFiniteSample(Idx3d),
}

/// 以默认阈值 (1, 2000) 构造渲染体. 适用于原始强度扫描.
#[inline]
pub fn render_default(volume: ArrayView3<'_, f32>) -> Result<RenderVolume, RenderError> {
    to_render_volume(volume, RENDER_THR_MIN, RENDER_THR_MAX)
}

/// 将体数据变换为半透明渲染用的 RGBA 字节体.
///
/// 纯函数: 内部先深拷贝, 不会修改调用方的数据. 依次执行:
///
/// 1. 钳制: 等于 0 的体素视为 `thr_min`; 低于 `thr_min` 抬升至
///    `thr_min`; 大于等于 `thr_max` 降至 `thr_max`.
/// 2. 归一: `(v - thr_min) / (thr_max - thr_min)`. 注意恰好等于
///    `thr_max` 的体素归一成恰好 1.0, 而真零体素与低信号体素在归一后
///    不可区分, 这是既定行为.
/// 3. 冠状轴镜像 (翻转第 1 轴), 匹配渲染器的朝向约定.
/// 4. 裁剪矢状轴前一半 (`0 .. X/2`).
/// 5. alpha = 归一值 × 255 截断取整; R = G = B = alpha (灰度半透明体).
/// 6. 叠加三条不透明标记线: 矢状轴前 40 体素 `(j=0, k=0)` 置纯红,
///    冠状轴前 40 体素 `(i=0, k=0)` 置纯绿, 轴向前 40 体素
///    `(i=0, j=0)` 置纯蓝. 长度超过轴长时按轴长截断.
pub fn to_render_volume(
    volume: ArrayView3<'_, f32>,
    thr_min: f32,
    thr_max: f32,
) -> Result<RenderVolume, RenderError> {
    if volume.is_empty() {
        return Err(RenderError::EmptyVolume);
    }
    if let Some((pos, _)) = volume.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(RenderError::NonFiniteSample(pos));
    }

    // 钳制与归一在深拷贝上就地进行.
    let span = thr_max - thr_min;
    let mut data = volume.to_owned();
    data.mapv_inplace(|v| {
        let v = if v == 0.0 { thr_min } else { v };
        (clamp(v, thr_min, thr_max) - thr_min) / span
    });

    // 冠状轴镜像, 矢状轴前半裁剪.
    data.invert_axis(Axis(1));
    let half_i = data.len_of(Axis(0)) / 2;
    let cropped = data.slice_move(ndarray::s![..half_i, .., ..]);

    let (x, y, z) = cropped.dim();
    let mut rgba = Array4::<u8>::zeros((x, y, z, RGBA_CHANNELS));
    for ((i, j, k), &v) in cropped.indexed_iter() {
        let a = (v * 255.0) as u8;
        let mut px = rgba.slice_mut(ndarray::s![i, j, k, ..]);
        px.fill(a);
    }

    // 标记线最后叠加, 不受阈值影响.
    let marker = |len: usize| AXIS_MARKER_LEN.min(len);
    for i in 0..marker(x) {
        set_rgba(&mut rgba, (i, 0, 0), [255, 0, 0, 255]);
    }
    for j in 0..marker(y) {
        set_rgba(&mut rgba, (0, j, 0), [0, 255, 0, 255]);
    }
    for k in 0..marker(z) {
        set_rgba(&mut rgba, (0, 0, k), [0, 0, 255, 255]);
    }

    Ok(rgba)
}

#[inline]
fn set_rgba(rgba: &mut RenderVolume, (i, j, k): Idx3d, value: [u8; RGBA_CHANNELS]) {
    for (ch, &v) in value.iter().enumerate() {
        rgba[(i, j, k, ch)] = v;
    }
}
