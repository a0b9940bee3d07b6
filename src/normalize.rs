//! # 栅格规范化模块
//!
//! 把任意可解码的源图像收拢成固定尺寸的规范 8 位灰度栅格，
//! 供后续位平面与直方图阶段使用。
//!
//! 彩色到灰度使用 ITU-R BT.709 亮度公式
//! (Y = 0.2126 R + 0.7152 G + 0.0722 B，即 `image` crate 的 `to_luma8`)，
//! 重采样固定使用 Lanczos3 窗函数滤波，不保持宽高比。

use crate::error::AnalysisError;
use crate::raster::Raster;
use image::imageops::{self, FilterType};

/// 解码源图像字节并规范化到目标尺寸。
///
/// 源图像与目标尺寸一致时跳过重采样，逐像素原样保留。
///
/// # Arguments
///
/// * `source` - 任意受支持容器 (BMP/PNG/JPEG/TIFF/WebP/QOI) 的完整字节。
/// * `target_width` / `target_height` - 规范栅格的目标尺寸。
///
/// # Errors
///
/// * 字节无法解码时返回 [`AnalysisError::UnsupportedFormat`]。
/// * 目标或源尺寸存在零时返回 [`AnalysisError::InvalidDimensions`]。
pub fn normalize(
    source: &[u8],
    target_width: u32,
    target_height: u32,
) -> Result<Raster, AnalysisError> {
    if target_width == 0 || target_height == 0 {
        return Err(AnalysisError::InvalidDimensions {
            width: target_width,
            height: target_height,
        });
    }

    let decoded = image::load_from_memory(source)
        .map_err(|err| AnalysisError::UnsupportedFormat(err.to_string()))?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(AnalysisError::InvalidDimensions {
            width: decoded.width(),
            height: decoded.height(),
        });
    }

    let gray = decoded.to_luma8();
    let resized = if gray.dimensions() == (target_width, target_height) {
        gray
    } else {
        imageops::resize(&gray, target_width, target_height, FilterType::Lanczos3)
    };

    Raster::from_pixels(target_width, target_height, resized.into_raw())
}
