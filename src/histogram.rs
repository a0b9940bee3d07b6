//! # 亮度直方图模块
//!
//! 统计规范栅格的 256 桶亮度分布，对 original/stego 两张直方图做
//! 逐桶差分，并提供严格的 CSV 交换格式。定长数组保证进程内的直方
//! 图形状不可能出错，形状校验只存在于解析外部 CSV 的入口。

use crate::constants::{HISTOGRAM_BINS, HISTOGRAM_CSV_HEADER};
use crate::error::AnalysisError;
use crate::raster::Raster;

/// 256 桶亮度直方图，`bins[v]` 为亮度 v 的像素个数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; HISTOGRAM_BINS],
}

/// 两张直方图的逐桶差分结果，只读。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramDiff {
    per_bin: [i64; HISTOGRAM_BINS],
    max_abs_diff: u64,
}

impl Histogram {
    /// 统计栅格的亮度分布。桶计数之和恒等于像素总数，
    /// 且与遍历顺序无关。
    pub fn of(raster: &Raster) -> Self {
        let mut bins = [0u64; HISTOGRAM_BINS];
        for &pixel in raster.pixels() {
            bins[pixel as usize] += 1;
        }
        Self { bins }
    }

    pub fn bins(&self) -> &[u64; HISTOGRAM_BINS] {
        &self.bins
    }

    /// 桶计数之和，即被统计栅格的像素总数。
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// 以 `self` 为 original、`stego` 为对照做逐桶差分：
    /// `per_bin[v] = self[v] - stego[v]`。
    pub fn diff(&self, stego: &Histogram) -> HistogramDiff {
        let mut per_bin = [0i64; HISTOGRAM_BINS];
        for (value, slot) in per_bin.iter_mut().enumerate() {
            *slot = self.bins[value] as i64 - stego.bins[value] as i64;
        }
        let max_abs_diff = per_bin.iter().map(|d| d.unsigned_abs()).max().unwrap_or(0);
        HistogramDiff {
            per_bin,
            max_abs_diff,
        }
    }

    /// 序列化为交换格式：`Brightness,Count` 表头加 256 行记录。
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(HISTOGRAM_BINS * 8);
        out.push_str(HISTOGRAM_CSV_HEADER);
        out.push('\n');
        for (value, count) in self.bins.iter().enumerate() {
            out.push_str(&format!("{value},{count}\n"));
        }
        out
    }

    /// 解析交换格式。语法是封闭的：表头必须逐字匹配，亮度必须按
    /// 0..=255 顺序出现且一个不少，计数必须是不超过 `i64::MAX` 的
    /// 非负整数 (保证逐桶差分始终可表示)；只容忍行尾的 `\r`。
    ///
    /// # Errors
    ///
    /// 任何偏离上述语法的输入都返回 [`AnalysisError::ShapeMismatch`]。
    pub fn from_csv(text: &str) -> Result<Self, AnalysisError> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| AnalysisError::ShapeMismatch("empty histogram file".to_string()))?;
        if header.trim_end_matches('\r') != HISTOGRAM_CSV_HEADER {
            return Err(AnalysisError::ShapeMismatch(format!(
                "unexpected header '{header}'"
            )));
        }

        let mut bins = [0u64; HISTOGRAM_BINS];
        let mut next_value = 0usize;
        for line in lines {
            let line = line.trim_end_matches('\r');
            let Some((value_text, count_text)) = line.split_once(',') else {
                return Err(AnalysisError::ShapeMismatch(format!(
                    "malformed record '{line}'"
                )));
            };
            if next_value >= HISTOGRAM_BINS {
                return Err(AnalysisError::ShapeMismatch(
                    "more than 256 brightness records".to_string(),
                ));
            }

            let value: usize = value_text.parse().map_err(|_| {
                AnalysisError::ShapeMismatch(format!("invalid brightness '{value_text}'"))
            })?;
            if value != next_value {
                return Err(AnalysisError::ShapeMismatch(format!(
                    "expected brightness {next_value}, found {value}"
                )));
            }

            let count: u64 = count_text.parse().map_err(|_| {
                AnalysisError::ShapeMismatch(format!("invalid count '{count_text}'"))
            })?;
            if i64::try_from(count).is_err() {
                return Err(AnalysisError::ShapeMismatch(format!(
                    "count {count} exceeds the signed 64-bit range"
                )));
            }
            bins[next_value] = count;
            next_value += 1;
        }

        if next_value != HISTOGRAM_BINS {
            return Err(AnalysisError::ShapeMismatch(format!(
                "expected {HISTOGRAM_BINS} brightness records, found {next_value}"
            )));
        }

        Ok(Self { bins })
    }
}

impl HistogramDiff {
    pub fn per_bin(&self) -> &[i64; HISTOGRAM_BINS] {
        &self.per_bin
    }

    /// 逐桶绝对差的最大值。
    pub fn max_abs_diff(&self) -> u64 {
        self.max_abs_diff
    }

    /// 计数发生变化的桶数。
    pub fn affected_bins(&self) -> usize {
        self.per_bin.iter().filter(|&&d| d != 0).count()
    }
}
