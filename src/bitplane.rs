//! # 位平面编解码模块
//!
//! 把 8 位灰度栅格拆成 8 个二值位平面，或从位平面集合按位或还原
//! 原始栅格。两个方向合在一起满足往返律：对任意规范栅格 r，
//! `reconstruct(&extract_all_planes(&r)) == r`。

use crate::constants::{BIT_PLANE_COUNT, PLANE_SET_VALUE};
use crate::error::AnalysisError;
use crate::raster::Raster;

/// 单个位平面：位序号 k (1 为最低有效位) 加上二值渲染的栅格。
/// 编码方向产出的栅格像素只会是 0 或 255。
#[derive(Debug, Clone, PartialEq)]
pub struct BitPlane {
    index: u8,
    raster: Raster,
}

impl BitPlane {
    /// 把既有栅格与位序号组合成位平面，序号越界时拒绝。
    ///
    /// # Errors
    ///
    /// 序号不在 1..=8 内时返回 [`AnalysisError::IndexOutOfRange`]。
    pub fn new(index: u8, raster: Raster) -> Result<Self, AnalysisError> {
        if !(1..=BIT_PLANE_COUNT).contains(&index) {
            return Err(AnalysisError::IndexOutOfRange(index));
        }
        Ok(Self { index, raster })
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn into_raster(self) -> Raster {
        self.raster
    }
}

/// 共享同一基础标识的一组位平面，排列顺序由调用方负责。
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGroup {
    pub base: String,
    pub planes: Vec<BitPlane>,
}

/// 提取序号为 `index` 的位平面。
///
/// 源像素第 `index - 1` 位为 1 时输出 255，否则输出 0。
///
/// # Errors
///
/// 序号不在 1..=8 内时返回 [`AnalysisError::IndexOutOfRange`]。
pub fn extract_plane(raster: &Raster, index: u8) -> Result<BitPlane, AnalysisError> {
    if !(1..=BIT_PLANE_COUNT).contains(&index) {
        return Err(AnalysisError::IndexOutOfRange(index));
    }

    let shift = index - 1;
    let pixels = raster
        .pixels()
        .iter()
        .map(|&pixel| {
            if (pixel >> shift) & 1 == 1 {
                PLANE_SET_VALUE
            } else {
                0
            }
        })
        .collect();

    let plane = Raster::from_pixels(raster.width(), raster.height(), pixels)?;
    BitPlane::new(index, plane)
}

/// 按位序号升序提取全部 8 个位平面。
pub fn extract_all_planes(raster: &Raster) -> Vec<BitPlane> {
    (1..=BIT_PLANE_COUNT)
        .flat_map(|index| extract_plane(raster, index))
        .collect()
}

/// 从位平面集合还原灰度栅格。
///
/// 每个位平面中值为 255 的像素贡献一位，按 `index - 1` 左移后按位或；
/// 缺失的平面按全零处理。
///
/// # Errors
///
/// * 集合为空时返回 [`AnalysisError::EmptyGroup`] (输出尺寸无从得知)。
/// * 平面尺寸不一致时返回 [`AnalysisError::DimensionMismatch`]。
pub fn reconstruct(planes: &[BitPlane]) -> Result<Raster, AnalysisError> {
    let Some(first) = planes.first() else {
        return Err(AnalysisError::EmptyGroup(String::new()));
    };

    let width = first.raster().width();
    let height = first.raster().height();
    let expected = (width as usize) * (height as usize);
    let mut pixels = vec![0u8; expected];

    for plane in planes {
        let raster = plane.raster();
        if (raster.width(), raster.height()) != (width, height) {
            return Err(AnalysisError::DimensionMismatch {
                expected,
                found: raster.pixels().len(),
            });
        }

        let bit = 1u8 << (plane.index() - 1);
        for (acc, &value) in pixels.iter_mut().zip(raster.pixels()) {
            if value == PLANE_SET_VALUE {
                *acc |= bit;
            }
        }
    }

    Raster::from_pixels(width, height, pixels)
}
