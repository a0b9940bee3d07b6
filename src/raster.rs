//! # 规范栅格模块
//!
//! 定义整条流水线共享的像素载体 [`Raster`]：固定为 8 位单通道灰度，
//! 底层使用 `image` crate 的 `GrayImage`，因此"像素数等于宽乘高、
//! 取值落在 0..=255"由类型结构本身保证。
//!
//! 同时提供规范容器 (BMP/PNG) 的字节级编解码。文件读写不在本模块内，
//! 由命令处理层负责。

use crate::error::AnalysisError;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;

/// 规范 8 位灰度栅格。构造完成后不可变，各阶段之间按值移交。
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: GrayImage,
}

impl Raster {
    /// 从裸像素构造栅格。
    ///
    /// # Errors
    ///
    /// * 宽或高为零时返回 [`AnalysisError::InvalidDimensions`]。
    /// * 像素数量与宽乘高不符时返回 [`AnalysisError::DimensionMismatch`]。
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, AnalysisError> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidDimensions { width, height });
        }

        let expected = (width as usize) * (height as usize);
        let found = pixels.len();
        if found != expected {
            return Err(AnalysisError::DimensionMismatch { expected, found });
        }

        let image = GrayImage::from_raw(width, height, pixels)
            .ok_or(AnalysisError::DimensionMismatch { expected, found })?;

        Ok(Self { image })
    }

    /// 解码规范容器中的 8 位灰度图像。
    ///
    /// BMP 解码器会把调色板灰度展开成 RGB，因此各通道处处相等的
    /// RGB/RGBA 输入会被精确折叠回单通道；真彩色、16 位或带透明度的
    /// 输入一律拒绝。
    ///
    /// # Errors
    ///
    /// * 字节无法解码或不满足灰度约定时返回 [`AnalysisError::UnsupportedFormat`]。
    /// * 宽或高为零时返回 [`AnalysisError::InvalidDimensions`]。
    pub fn decode_canonical(bytes: &[u8]) -> Result<Self, AnalysisError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|err| AnalysisError::UnsupportedFormat(err.to_string()))?;

        let image = match decoded {
            DynamicImage::ImageLuma8(image) => image,
            DynamicImage::ImageRgb8(image) => collapse_rgb(image)?,
            DynamicImage::ImageRgba8(image) => collapse_rgba(image)?,
            other => {
                return Err(AnalysisError::UnsupportedFormat(format!(
                    "expected an 8-bit grayscale image, found {:?}",
                    other.color()
                )));
            }
        };

        if image.width() == 0 || image.height() == 0 {
            return Err(AnalysisError::InvalidDimensions {
                width: image.width(),
                height: image.height(),
            });
        }

        Ok(Self { image })
    }

    /// 按给定容器格式无损编码为字节。
    ///
    /// # Errors
    ///
    /// 编码器拒绝 8 位灰度布局时返回 [`AnalysisError::UnsupportedFormat`]。
    pub fn encode_canonical(&self, format: ImageFormat) -> Result<Vec<u8>, AnalysisError> {
        let mut buffer = Cursor::new(Vec::new());
        self.image
            .write_to(&mut buffer, format)
            .map_err(|err| AnalysisError::UnsupportedFormat(err.to_string()))?;
        Ok(buffer.into_inner())
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// 按行优先顺序访问全部像素。
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// 以 `image` crate 的视图形式借出底层缓冲。
    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}

fn collapse_rgb(image: RgbImage) -> Result<GrayImage, AnalysisError> {
    let (width, height) = image.dimensions();
    let mut pixels = Vec::with_capacity((width as usize) * (height as usize));

    for pixel in image.pixels() {
        let [r, g, b] = pixel.0;
        if r != g || g != b {
            return Err(AnalysisError::UnsupportedFormat(
                "color image where 8-bit grayscale was expected".to_string(),
            ));
        }
        pixels.push(r);
    }

    gray_from_parts(width, height, pixels)
}

fn collapse_rgba(image: RgbaImage) -> Result<GrayImage, AnalysisError> {
    let (width, height) = image.dimensions();
    let mut pixels = Vec::with_capacity((width as usize) * (height as usize));

    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        if r != g || g != b || a != u8::MAX {
            return Err(AnalysisError::UnsupportedFormat(
                "color or translucent image where 8-bit grayscale was expected".to_string(),
            ));
        }
        pixels.push(r);
    }

    gray_from_parts(width, height, pixels)
}

fn gray_from_parts(width: u32, height: u32, pixels: Vec<u8>) -> Result<GrayImage, AnalysisError> {
    let expected = (width as usize) * (height as usize);
    let found = pixels.len();
    GrayImage::from_raw(width, height, pixels)
        .ok_or(AnalysisError::DimensionMismatch { expected, found })
}
