//! # 文件名语法与分组模块
//!
//! 流水线靠命名约定把磁盘上的散落文件织回结构：位平面文件的主干
//! 是 `<base>_k<N>` (N 为 1..=8)，直方图文件是
//! `hist_<base>_original.csv` / `hist_<base>_stego.csv`。
//!
//! 语法是封闭的：解析器要么给出带类型的解析结果，要么整体拒绝，
//! 不做任何"尽力而为"的字符串修补。分组与配对的输出顺序只由文件
//! 名决定，与输入顺序无关。

use crate::constants::{BIT_PLANE_COUNT, CANONICAL_EXTENSIONS, HISTOGRAM_FILE_PREFIX};
use crate::error::AnalysisError;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::path::{Path, PathBuf};

/// 直方图对中的角色，同时也是文件名后缀。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairRole {
    Original,
    Stego,
}

impl PairRole {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Stego => "stego",
        }
    }

    pub fn counterpart(self) -> Self {
        match self {
            Self::Original => Self::Stego,
            Self::Stego => Self::Original,
        }
    }
}

impl fmt::Display for PairRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// `<base>_k<N>` 主干的解析结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneName {
    pub base: String,
    pub index: u8,
}

/// `<base>_original` / `<base>_stego` 主干的解析结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairName {
    pub base: String,
    pub role: PairRole,
}

/// 同一 base 下的一个位平面文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneEntry {
    pub index: u8,
    pub path: PathBuf,
}

/// 按 base 聚起来的一组位平面文件，条目按位序号升序。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneGroup {
    pub base: String,
    pub entries: Vec<PlaneEntry>,
}

/// 配齐的一对直方图文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramPair {
    pub base: String,
    pub original: PathBuf,
    pub stego: PathBuf,
}

/// 解析位平面主干：最后一个 `_k` 之后必须是纯数字且落在 1..=8，
/// base 不得为空。不满足则整体拒绝。
pub fn parse_plane_stem(stem: &str) -> Option<PlaneName> {
    let (base, digits) = stem.rsplit_once("_k")?;
    if base.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let index: u8 = digits.parse().ok()?;
    if !(1..=BIT_PLANE_COUNT).contains(&index) {
        return None;
    }

    Some(PlaneName {
        base: base.to_string(),
        index,
    })
}

/// 解析直方图主干：以 `_original` 或 `_stego` 结尾且 base 非空。
pub fn parse_pair_stem(stem: &str) -> Option<PairName> {
    for role in [PairRole::Original, PairRole::Stego] {
        if let Some(base) = stem.strip_suffix(role.suffix()) {
            let base = base.strip_suffix('_')?;
            if !base.is_empty() {
                return Some(PairName {
                    base: base.to_string(),
                    role,
                });
            }
        }
    }
    None
}

/// 识别位平面文件：扩展名必须是规范容器 (bmp/png)，主干满足平面语法。
pub fn parse_plane_file(path: &Path) -> Option<PlaneName> {
    if !has_canonical_extension(path) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    parse_plane_stem(stem)
}

/// 识别直方图文件：`hist_<base>_<role>.csv`。
pub fn parse_histogram_file(path: &Path) -> Option<PairName> {
    let extension = path.extension()?.to_str()?;
    if !extension.eq_ignore_ascii_case("csv") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let rest = stem.strip_prefix(HISTOGRAM_FILE_PREFIX)?;
    parse_pair_stem(rest)
}

fn has_canonical_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            CANONICAL_EXTENSIONS
                .iter()
                .any(|allowed| extension.eq_ignore_ascii_case(allowed))
        })
}

/// 把散落的平面文件按 base 聚组。
///
/// 组按 base 字典序排列，组内按位序号升序；同一 (base, 序号) 出现
/// 多个文件时保留路径字典序最小的那个。不匹配语法的路径被忽略。
pub fn group_plane_files(paths: &[PathBuf]) -> Vec<PlaneGroup> {
    let mut groups: BTreeMap<String, BTreeMap<u8, PathBuf>> = BTreeMap::new();

    for path in paths {
        let Some(name) = parse_plane_file(path) else {
            continue;
        };
        match groups.entry(name.base).or_default().entry(name.index) {
            Entry::Vacant(slot) => {
                slot.insert(path.clone());
            }
            Entry::Occupied(mut slot) => {
                if path < slot.get() {
                    slot.insert(path.clone());
                }
            }
        }
    }

    groups
        .into_iter()
        .map(|(base, entries)| PlaneGroup {
            base,
            entries: entries
                .into_iter()
                .map(|(index, path)| PlaneEntry { index, path })
                .collect(),
        })
        .collect()
}

/// 按 base 配对直方图文件。
///
/// 结果按 base 字典序排列；缺少另一半的 base 产出
/// [`AnalysisError::MissingPair`]，由调用方决定报告方式。
pub fn pair_histogram_files(paths: &[PathBuf]) -> Vec<Result<HistogramPair, AnalysisError>> {
    let mut slots: BTreeMap<String, (Option<PathBuf>, Option<PathBuf>)> = BTreeMap::new();

    for path in paths {
        let Some(name) = parse_histogram_file(path) else {
            continue;
        };
        let slot = slots.entry(name.base).or_default();
        match name.role {
            PairRole::Original => keep_first(&mut slot.0, path),
            PairRole::Stego => keep_first(&mut slot.1, path),
        }
    }

    slots
        .into_iter()
        .map(|(base, halves)| match halves {
            (Some(original), Some(stego)) => Ok(HistogramPair {
                base,
                original,
                stego,
            }),
            (Some(_), None) => Err(AnalysisError::MissingPair {
                base,
                missing: PairRole::Stego,
            }),
            (None, _) => Err(AnalysisError::MissingPair {
                base,
                missing: PairRole::Original,
            }),
        })
        .collect()
}

fn keep_first(slot: &mut Option<PathBuf>, path: &Path) {
    let replace = match slot {
        None => true,
        Some(existing) => path < existing.as_path(),
    };
    if replace {
        *slot = Some(path.to_path_buf());
    }
}
