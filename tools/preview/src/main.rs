//! 流水线演练工具.
//!
//! 载入一个 BraTS FLAIR 扫描, 打印其元信息, 导出三平面默认切片与
//! 代表性轴向切片 PNG, 用内置阈值模型跑一遍完整分割,
//! 最后构造体渲染 RGBA 数据并报告其形状.
//!
//! 扫描路径解析顺序:
//!
//! 1. 若环境变量 `$MR_SCAN` 非空, 直接将其作为 nii 文件路径;
//! 2. 否则, 从 `$BRATS_TRAIN_DIR` 或 `$HOME/dataset/brats/train`
//!    目录加载训练集的第一个 FLAIR 扫描.
//!
//! 输出落在 `./preview_out` 目录.

mod model;

use mr_berry::prelude::*;
use mr_berry::render;
use mr_berry::report;
use std::env;
use std::fs;
use std::path::PathBuf;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
fn sep() {
    println!("{SEP}");
}

/// 获取 BraTS 训练集基本路径.
///
/// 1. 若环境变量 `$BRATS_TRAIN_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/brats/train`.
fn train_dir_from_env_or_home() -> PathBuf {
    if let Ok(d) = env::var("BRATS_TRAIN_DIR") {
        PathBuf::from(d)
    } else {
        home_dataset_dir_with(["brats", "train"]).unwrap()
    }
}

fn load_scan() -> MriScan {
    if let Ok(p) = env::var("MR_SCAN") {
        return MriScan::open(&p).expect("打开 $MR_SCAN 指定的文件失败");
    }
    let dir = train_dir_from_env_or_home();
    assert!(dir.is_dir(), "数据集目录不存在: {}", dir.display());
    let (num, scan) = brats::full_flair_loader(&dir)
        .next()
        .expect("训练集为空");
    println!("使用训练集病例 {num:03}");
    scan.expect("打开训练集扫描失败")
}

fn main() {
    let out_dir = PathBuf::from("preview_out");
    fs::create_dir_all(&out_dir).expect("创建输出目录失败");

    let scan = load_scan();
    let (i, j, k) = scan.shape();
    let [pi, pj, pk] = scan.pix_dim();

    sep();
    println!("形状: {i} × {j} × {k} (矢状 × 冠状 × 轴向)");
    println!("体素: {pi:.2} × {pj:.2} × {pk:.2} mm, 各向同: {}", scan.is_isotropic());
    let (di, dj, dk) = view::default_indices(&scan.data());
    println!("默认切片下标: 矢状 {di}, 冠状 {dj}, 轴向 {dk}");
    let mid = scan.mean_intensity(
        (0..i).flat_map(move |a| (0..j).map(move |b| (a, b, dk))),
    );
    println!("中间轴向切片平均强度: {mid:.2}");

    // 三平面默认切片.
    sep();
    for axis in ViewAxis::ALL {
        let idx = view::default_index(&scan.data(), axis);
        let sl = view::extract(scan.data(), axis, idx).expect("默认下标必然合法");
        let path = out_dir.join(format!("{}_{idx:03}.png", axis.name()));
        save_plane_png(sl, &path);
        println!("已导出 {}", path.display());
    }

    let reps = report::save_representative_slices(&scan, &out_dir).expect("导出代表性切片失败");
    for p in &reps {
        println!("已导出 {}", p.display());
    }

    // 端到端分割.
    sep();
    let mut store = VolumeStore::new();
    store.set_scan(scan);

    let engine = SegEngine::new(model::ThresholdModel);
    let label = engine
        .segment_with(store.scan().unwrap(), &CancelFlag::new(), |done, total| {
            if done % 32 == 0 || done == total {
                println!("预处理 {done}/{total}");
            }
        })
        .expect("分割失败");

    let [bg, necrotic, edema, enhancing] = label.numeric_statistics();
    println!("背景 {bg}, 坏死核心 {necrotic}, 水肿 {edema}, 增强肿瘤 {enhancing}");

    let npy = out_dir.join("label.npy");
    label.export_npy(&npy).expect("导出 npy 失败");
    println!("已导出 {}", npy.display());
    store.set_label(label);

    // 体渲染数据.
    sep();
    let rgba = render::render_default(store.scan().unwrap().data()).expect("渲染变换失败");
    let (x, y, z, c) = rgba.dim();
    println!("渲染体: {x} × {y} × {z} × {c}");
}

/// 将一张提取出来的二维平面落盘为灰度 PNG.
///
/// 提取结果是拥有所有权的数组, 这里把它包装成单切片扫描,
/// 复用 [`ImgWriteVis`] 的可视化存储路径.
fn save_plane_png(plane: ndarray::Array2<f32>, path: &std::path::Path) {
    let scan = MriScan::from_parts(plane.insert_axis(ndarray::Axis(2)), [1.0; 3]);
    scan.axial_slice_at(0).save(path).expect("导出 PNG 失败");
}
