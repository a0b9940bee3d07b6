//! # 复合网格模块
//!
//! 把一组位平面平铺成 4 列 x 2 行的单张对比图：平面按给定顺序
//! 行优先填充，空余单元格保持全黑，每个单元格标注其实际位序号，
//! 组标识写在第一行第二个单元格内。

use crate::bitplane::ImageGroup;
use crate::constants::{CELL_LABEL_OFFSET, GRID_COLS, GRID_ROWS, GROUP_LABEL_OFFSET};
use crate::error::AnalysisError;
use crate::label::{LabelFont, draw_label};
use crate::raster::Raster;
use image::{GrayImage, imageops};

/// 合成一组位平面的对比图。
///
/// 画布尺寸为 `(4w, 2h)`，`w`/`h` 取自组内平面；位置 `idx` 的平面
/// 粘贴到单元格 `(idx % 4, idx / 4)`，超出 8 个的平面被忽略。
/// 每个被占用的单元格在原点偏移 (5,5) 处标注 `k=<位序号>`，
/// `label` 写在单元格 (1,0) 原点偏移 (10,10) 处，前景值均为 255。
///
/// # Errors
///
/// * 组内没有平面时返回 [`AnalysisError::EmptyGroup`]。
/// * 平面尺寸不一致时返回 [`AnalysisError::DimensionMismatch`]。
pub fn composite(
    group: &ImageGroup,
    label: &str,
    font: &LabelFont,
) -> Result<Raster, AnalysisError> {
    let Some(first) = group.planes.first() else {
        return Err(AnalysisError::EmptyGroup(group.base.clone()));
    };

    let cell_width = first.raster().width();
    let cell_height = first.raster().height();
    let expected = (cell_width as usize) * (cell_height as usize);

    for plane in &group.planes {
        let raster = plane.raster();
        if (raster.width(), raster.height()) != (cell_width, cell_height) {
            return Err(AnalysisError::DimensionMismatch {
                expected,
                found: raster.pixels().len(),
            });
        }
    }

    let cells = (GRID_COLS * GRID_ROWS) as usize;
    let mut canvas = GrayImage::new(cell_width * GRID_COLS, cell_height * GRID_ROWS);

    for (position, plane) in group.planes.iter().take(cells).enumerate() {
        let col = position as u32 % GRID_COLS;
        let row = position as u32 / GRID_COLS;
        let x = col * cell_width;
        let y = row * cell_height;

        imageops::replace(
            &mut canvas,
            plane.raster().as_image(),
            i64::from(x),
            i64::from(y),
        );
        draw_label(
            &mut canvas,
            &format!("k={}", plane.index()),
            x + CELL_LABEL_OFFSET,
            y + CELL_LABEL_OFFSET,
            font,
        );
    }

    draw_label(
        &mut canvas,
        label,
        cell_width + GROUP_LABEL_OFFSET,
        GROUP_LABEL_OFFSET,
        font,
    );

    Raster::from_pixels(canvas.width(), canvas.height(), canvas.into_raw())
}
