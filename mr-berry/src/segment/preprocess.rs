//! 逐切片预处理: min-max 归一化与正方形重采样.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use ndarray::{Array2, ArrayView2};
use num::Float;

/// 将切片独立地 min-max 归一化到 \[0, 1\]:
/// `(x - min) / (max - min + eps)`.
///
/// `eps` 保护近似常数切片不被除零; 完全常数的切片归一化为全零.
pub fn min_max_normalize<T: Float>(img: ArrayView2<'_, T>, eps: T) -> Array2<T> {
    let mut lo = T::infinity();
    let mut hi = T::neg_infinity();
    for &v in img.iter() {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if img.is_empty() {
        return img.to_owned();
    }
    let span = hi - lo + eps;
    img.mapv(|v| (v - lo) / span)
}

/// 将切片双线性重采样到 `size × size`.
///
/// 每个切片独立重采样; 常数切片重采样后仍为常数.
///
/// # 注意
///
/// 输入必须已归一化到 \[0, 1\]: `image` 的 f32 重采样会把结果
/// 钳制到该区间, 区间外的强度会被截断.
pub fn resize_to_square(img: ArrayView2<'_, f32>, size: usize) -> Array2<f32> {
    debug_assert_ne!(size, 0);
    let (h, w) = img.dim();

    // 第 0 轴作图像高, 第 1 轴作图像宽.
    let buf: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(w as u32, h as u32, |x, y| Luma([img[(y as usize, x as usize)]]));
    let resized = imageops::resize(&buf, size as u32, size as u32, FilterType::Triangle);

    Array2::from_shape_fn((size, size), |(r, c)| resized.get_pixel(c as u32, r as u32)[0])
}

#[cfg(test)]
mod tests {
    use super::{min_max_normalize, resize_to_square};
    use crate::consts::{MODEL_INPUT_SIZE, NORM_EPS};
    use ndarray::{arr2, Array2};

    fn float_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_normalize_generic() {
        let img = arr2(&[[0.0f32, 50.0], [100.0, 25.0]]);
        let norm = min_max_normalize(img.view(), NORM_EPS);
        assert!(float_eq(norm[(0, 0)], 0.0));
        assert!(float_eq(norm[(1, 0)], 1.0));
        assert!(float_eq(norm[(0, 1)], 0.5));
        assert!(float_eq(norm[(1, 1)], 0.25));
    }

    /// 退化切片律: `max == min` 的切片归一化为全零.
    #[test]
    fn test_normalize_degenerate_range() {
        let img = Array2::from_elem((5, 7), 123.456f32);
        let norm = min_max_normalize(img.view(), NORM_EPS);
        assert!(norm.iter().all(|&v| v == 0.0));

        let zeroes = Array2::<f32>::zeros((3, 3));
        let norm = min_max_normalize(zeroes.view(), NORM_EPS);
        assert!(norm.iter().all(|&v| v == 0.0));
    }

    /// 常数插值律: 1×1 常数切片重采样到 128×128 后仍为常数.
    #[test]
    fn test_resize_constant_slice() {
        let img = Array2::from_elem((1, 1), 0.5f32);
        let resized = resize_to_square(img.view(), MODEL_INPUT_SIZE);
        assert_eq!(resized.dim(), (MODEL_INPUT_SIZE, MODEL_INPUT_SIZE));
        assert!(resized.iter().all(|&v| float_eq(v, 0.5)));
    }

    #[test]
    fn test_resize_identity_size() {
        let img = arr2(&[[0.1f32, 0.2], [0.3, 0.4]]);
        let resized = resize_to_square(img.view(), 2);
        for (pos, &v) in img.indexed_iter() {
            assert!(float_eq(resized[pos], v));
        }
    }
}
