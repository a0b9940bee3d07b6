/// 规范栅格的默认目标宽度 (像素)。
pub const DEFAULT_TARGET_WIDTH: u32 = 512;

/// 规范栅格的默认目标高度 (像素)。
pub const DEFAULT_TARGET_HEIGHT: u32 = 512;

/// 8 位灰度图像的位平面数量。
/// 位序号 k 的取值范围为 1 (最低有效位) 到 8 (最高有效位)。
pub const BIT_PLANE_COUNT: u8 = 8;

/// 位平面中 "位为 1" 像素的渲染值，"位为 0" 渲染为 0。
pub const PLANE_SET_VALUE: u8 = 255;

/// 复合网格的列数。
pub const GRID_COLS: u32 = 4;

/// 复合网格的行数。
/// 4 列 x 2 行恰好容纳全部 8 个位平面。
pub const GRID_ROWS: u32 = 2;

/// 单元格标注 (k=N) 相对单元格原点的偏移 (像素)。
pub const CELL_LABEL_OFFSET: u32 = 5;

/// 组标注相对其所在单元格原点的偏移 (像素)。
pub const GROUP_LABEL_OFFSET: u32 = 10;

/// 标注文字的前景灰度值。
pub const LABEL_FILL: u8 = 255;

/// 可缩放字体渲染标注时的像素高度。
pub const LABEL_PIXEL_HEIGHT: f32 = 20.0;

/// 内置点阵字体的放大倍数。
pub const BUILTIN_GLYPH_SCALE: u32 = 2;

/// 亮度直方图的桶数，对应 8 位灰度的 256 个取值。
pub const HISTOGRAM_BINS: usize = 256;

/// 直方图 CSV 交换格式的表头。
pub const HISTOGRAM_CSV_HEADER: &str = "Brightness,Count";

/// 直方图 CSV 文件名前缀，完整形式为 hist_<base>_<role>.csv。
pub const HISTOGRAM_FILE_PREFIX: &str = "hist_";

/// 规范栅格允许的无损容器扩展名。
pub const CANONICAL_EXTENSIONS: [&str; 2] = ["bmp", "png"];
