//! 🧠欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{
    ImgWriteRaw, ImgWriteVis, LabelSlice, LabelSliceMut, MriScan, ScanSlice, ScanSliceMut,
    TumorLabel, VolumeMeta,
};

pub use crate::store::VolumeStore;

pub use crate::consts::gray::{BRATS_BACKGROUND, BRATS_EDEMA, BRATS_ENHANCING, BRATS_NECROTIC};
pub use crate::consts::{BRATS_TRAINING_SET_LEN, MODEL_INPUT_SIZE, SEG_CLASSES};

pub use crate::view::{self, ViewAxis};

pub use crate::segment::{CancelFlag, SegEngine, TumorModel};

pub use crate::render::{render_default, to_render_volume, RenderVolume};

pub use crate::report::representative_axial_indices;

pub use crate::dataset::home_dataset_dir_with;
pub use crate::dataset::{self, brats};
