//! # 错误类型模块
//!
//! 定义分析流水线核心阶段的类型化错误。
//! 核心函数在遇到非法输入时立即返回这些错误，不做任何静默兜底；
//! 是报告、跳过还是中止，由上层批处理逻辑决定。

use crate::grouping::PairRole;
use thiserror::Error;

/// 分析核心的错误枚举。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// 输入字节无法解码，或解码结果不是 8 位灰度。
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// 宽或高为零。
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// 位平面序号超出 1..=8。
    #[error("bit plane index {0} is out of range (expected 1..=8)")]
    IndexOutOfRange(u8),

    /// 像素数量与预期不符，以像素个数计。
    #[error("raster size mismatch: expected {expected} pixels, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// 图像组中没有任何位平面。
    #[error("image group '{0}' contains no bit planes")]
    EmptyGroup(String),

    /// 数据形状与预期不符：直方图串行形式偏离 256 行交换格式，
    /// 或参与比较的两幅栅格宽高不一致。
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// 直方图对缺少 original 或 stego 一侧。
    #[error("histogram pair '{base}' is missing its {missing} half")]
    MissingPair { base: String, missing: PairRole },
}
