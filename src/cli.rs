//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::constants::{DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH};
use crate::grouping::PairRole;
use clap::{Parser, ValueEnum};
use image::ImageFormat;
use std::fmt;
use std::path::PathBuf;

/// 一款面向 LSB (最低有效位) 隐写分析的命令行工具，用于对无损格式图像 (如 PNG, BMP) 做位平面分解与直方图对比。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款面向 LSB (最低有效位) 隐写分析的命令行工具，用于对无损格式图像 (如 PNG, BMP) 做位平面分解与直方图对比。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令，覆盖从归一化到保真度评估的完整分析流水线。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 将输入图像 (或目录中的所有图像) 归一化为固定尺寸的 8 位灰度图。
    Normalize(NormalizeArgs),

    /// 从灰度图像中提取位平面并保存为二值图像。
    Planes(PlanesArgs),

    /// 将同组位平面拼接为带标注的 4x2 网格总览图。
    Composite(CompositeArgs),

    /// 从位平面文件重建原始灰度图像。
    Reconstruct(ReconstructArgs),

    /// 统计灰度图像的亮度直方图并写出 CSV。
    Histogram(HistogramArgs),

    /// 按 base 配对目录中的直方图 CSV 并给出逐 bin 差异。
    Compare(CompareArgs),

    /// 计算两幅灰度图像之间的 MSE / PSNR / SSIM。
    Fidelity(FidelityArgs),
}

/// 'normalize' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct NormalizeArgs {
    /// 输入图像文件，或包含若干图像的目录。
    #[arg(short, long)]
    pub input: PathBuf,

    /// 归一化后的目标宽度 (像素)。
    #[arg(long, default_value_t = DEFAULT_TARGET_WIDTH)]
    pub width: u32,

    /// 归一化后的目标高度 (像素)。
    #[arg(long, default_value_t = DEFAULT_TARGET_HEIGHT)]
    pub height: u32,

    /// 输出使用的无损容器格式。
    #[arg(short, long, value_enum, default_value_t = CanonicalFormat::Bmp)]
    pub format: CanonicalFormat,

    /// 保存结果文件的输出目录。
    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,

    /// 允许覆盖已存在的输出文件。
    #[arg(long)]
    pub force: bool,
}

/// 'planes' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct PlanesArgs {
    /// 要分解的灰度图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 只提取指定的位平面 (1 = 最低有效位, 8 = 最高有效位)；省略时提取全部 8 个。
    #[arg(short = 'k', long)]
    pub plane: Option<u8>,

    /// 保存结果文件的输出目录。
    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,

    /// 允许覆盖已存在的输出文件。
    #[arg(long)]
    pub force: bool,
}

/// 'composite' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CompositeArgs {
    /// 包含位平面文件 (<base>_k<N>) 的目录。
    #[arg(short, long)]
    pub dir: PathBuf,

    /// 用于标注的 TrueType 字体文件；省略或加载失败时退回内置像素字体。
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// 保存结果文件的输出目录。
    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,

    /// 允许覆盖已存在的输出文件。
    #[arg(long)]
    pub force: bool,
}

/// 'reconstruct' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct ReconstructArgs {
    /// 包含位平面文件 (<base>_k<N>) 的目录。
    #[arg(short, long)]
    pub dir: PathBuf,

    /// 保存结果文件的输出目录。
    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,

    /// 允许覆盖已存在的输出文件。
    #[arg(long)]
    pub force: bool,
}

/// 'histogram' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HistogramArgs {
    /// 要统计的灰度图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 直方图在配对中的角色；省略时尝试从文件名后缀推断。
    #[arg(short, long, value_enum)]
    pub role: Option<HistogramRole>,

    /// 输出文件名使用的 base；省略时从文件名推导。
    #[arg(short, long)]
    pub base: Option<String>,

    /// 保存结果文件的输出目录。
    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,

    /// 允许覆盖已存在的输出文件。
    #[arg(long)]
    pub force: bool,
}

/// 'compare' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// 包含直方图 CSV (hist_<base>_<role>.csv) 的目录。
    #[arg(short, long)]
    pub dir: PathBuf,
}

/// 'fidelity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct FidelityArgs {
    /// 原始灰度图像文件路径。
    #[arg(short, long)]
    pub original: PathBuf,

    /// 待评估的 (可能经过隐写的) 灰度图像文件路径。
    #[arg(short, long)]
    pub stego: PathBuf,
}

/// 流水线认可的无损输出容器。
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalFormat {
    Bmp,
    Png,
}

impl CanonicalFormat {
    /// 容器对应的文件扩展名 (小写、不含点)。
    pub fn extension(self) -> &'static str {
        match self {
            Self::Bmp => "bmp",
            Self::Png => "png",
        }
    }

    /// 容器对应的 `image` crate 编码格式。
    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Bmp => ImageFormat::Bmp,
            Self::Png => ImageFormat::Png,
        }
    }
}

impl fmt::Display for CanonicalFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// 直方图在 original/stego 配对中的角色。
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistogramRole {
    Original,
    Stego,
}

impl From<HistogramRole> for PairRole {
    fn from(role: HistogramRole) -> Self {
        match role {
            HistogramRole::Original => Self::Original,
            HistogramRole::Stego => Self::Stego,
        }
    }
}
