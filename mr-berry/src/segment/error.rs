//! 分割流水线运行时错误.

use super::ModelError;
use crate::Idx3d;

/// 分割运行时错误.
///
/// 任何错误分支都保证不产生部分标注体:
/// 引擎要么返回完整结果, 要么什么都不改.
#[derive(Debug)]
pub enum SegmentError {
    /// 输入体数据退化 (某个轴长度为零).
    EmptyVolume,

    /// 输入体数据含非有限值 (NaN/inf). 参数为首个坏体素的下标.
    NonFiniteSample(Idx3d),

    /// 模型推理失败, 或其输出形状不符.
    Inference(ModelError),

    /// 协同取消在推理发出之前被响应.
    Cancelled,
}

impl From<ModelError> for SegmentError {
    #[inline]
    fn from(value: ModelError) -> Self {
        Self::Inference(value)
    }
}
