//! # 标注渲染模块
//!
//! 复合图里的文字标注有两条渲染路径：调用方提供 TTF/OTF 时走
//! `imageproc` 的矢量渲染；否则使用内置 5x7 点阵字体。点阵路径
//! 覆盖数字、拉丁字母 (大小写折叠) 和 `= _ - . : /`，表外字符只
//! 前进不落墨，因此永远不会使合成操作失败。
//!
//! 选择哪条路径是一次性的显式配置 ([`LabelFont`])，由命令处理层
//! 在加载字体失败时决定是否退回点阵字体。

use crate::constants::{BUILTIN_GLYPH_SCALE, LABEL_FILL, LABEL_PIXEL_HEIGHT};
use crate::error::AnalysisError;
use ab_glyph::{FontVec, PxScale};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_text_mut;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

/// 标注字体配置：矢量字体或内置点阵。
#[derive(Debug)]
pub enum LabelFont {
    Scalable(FontVec),
    Builtin,
}

impl LabelFont {
    /// 从 TTF/OTF 字节构建可缩放字体。
    ///
    /// # Errors
    ///
    /// 数据不是可解析的字体时返回 [`AnalysisError::UnsupportedFormat`]。
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, AnalysisError> {
        let font = FontVec::try_from_vec(data)
            .map_err(|err| AnalysisError::UnsupportedFormat(err.to_string()))?;
        Ok(Self::Scalable(font))
    }
}

/// 在 `(x, y)` 处以前景值 255 绘制一行标注，越界部分直接裁掉。
pub fn draw_label(canvas: &mut GrayImage, text: &str, x: u32, y: u32, font: &LabelFont) {
    match font {
        LabelFont::Scalable(font) => draw_text_mut(
            canvas,
            Luma([LABEL_FILL]),
            x as i32,
            y as i32,
            PxScale::from(LABEL_PIXEL_HEIGHT),
            font,
            text,
        ),
        LabelFont::Builtin => draw_builtin(canvas, text, x, y),
    }
}

fn draw_builtin(canvas: &mut GrayImage, text: &str, x: u32, y: u32) {
    let scale = BUILTIN_GLYPH_SCALE;
    let mut pen_x = x;

    for ch in text.chars() {
        if let Some(rows) = builtin_glyph(ch.to_ascii_lowercase()) {
            for (row, bits) in rows.iter().copied().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let block_x = pen_x.saturating_add(col * scale);
                    let block_y = y.saturating_add(row as u32 * scale);
                    fill_block(canvas, block_x, block_y, scale);
                }
            }
        }
        pen_x = pen_x.saturating_add(GLYPH_ADVANCE * scale);
    }
}

fn fill_block(canvas: &mut GrayImage, x: u32, y: u32, size: u32) {
    for dy in 0..size {
        for dx in 0..size {
            let px = x.saturating_add(dx);
            let py = y.saturating_add(dy);
            if px < canvas.width() && py < canvas.height() {
                canvas.put_pixel(px, py, Luma([LABEL_FILL]));
            }
        }
    }
}

/// 5x7 点阵，每行 5 位，最高位是最左一列。
fn builtin_glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'a' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'b' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'c' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'd' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'e' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'f' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'g' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'h' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'i' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'j' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'k' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'l' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'm' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'n' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'o' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'p' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'r' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        's' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        't' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'u' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'v' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'w' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'x' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '=' => [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '/' => [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000],
        _ => return None,
    };
    Some(rows)
}
