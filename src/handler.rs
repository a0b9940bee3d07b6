//! # 命令处理逻辑模块
//!
//! 包含处理各个子命令的高级业务逻辑。
//! 本模块是整个 crate 中唯一接触文件系统的地方：负责读写磁盘、
//! 协调核心分析算法以及向用户报告结果，核心模块只处理内存中的数据。

use crate::bitplane::{BitPlane, ImageGroup, extract_all_planes, extract_plane, reconstruct};
use crate::cli::{
    CanonicalFormat, CompareArgs, CompositeArgs, FidelityArgs, HistogramArgs, NormalizeArgs,
    PlanesArgs, ReconstructArgs,
};
use crate::composite::composite;
use crate::constants::HISTOGRAM_FILE_PREFIX;
use crate::grouping::{PairRole, PlaneGroup, group_plane_files, pair_histogram_files, parse_pair_stem};
use crate::histogram::Histogram;
use crate::label::LabelFont;
use crate::metrics;
use crate::normalize;
use crate::raster::Raster;
use anyhow::{Context, Result};
use colored::Colorize;
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Normalize' 命令的执行逻辑。
///
/// 输入既可以是单个图像文件，也可以是一个目录；目录模式下逐个处理
/// 其中的文件，无法解码或已存在输出的文件会被跳过并给出警告。
///
/// # Arguments
///
/// * `args` - 包含输入路径、目标尺寸与输出格式的 `NormalizeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法创建输出目录或读取输入。
/// * 单文件模式下图像无法解码或归一化。
/// * 目录模式下没有任何一个文件被成功归一化。
/// * 输出文件已存在且未指定 `--force`。
pub fn handle_normalize(args: NormalizeArgs) -> Result<()> {
    prepare_outdir(&args.outdir)?;

    if args.input.is_dir() {
        let mut normalized = 0usize;
        for path in list_directory(&args.input)? {
            match normalize_one(&path, &args) {
                Ok(dest) => {
                    println!(
                        "The image has been successfully normalized and saved: {}",
                        dest.to_string_lossy().green().bold()
                    );
                    normalized += 1;
                }
                Err(error) => println!("{} {:#}", "Skipped:".yellow(), error),
            }
        }

        anyhow::ensure!(
            normalized > 0,
            "No image in the directory could be normalized: {}",
            args.input.to_string_lossy().red().bold()
        );

        println!(
            "Normalized {} image(s).",
            normalized.to_string().green().bold()
        );
        return Ok(());
    }

    let dest = normalize_one(&args.input, &args)?;
    println!(
        "The image has been successfully normalized and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Planes' 命令的执行逻辑。
///
/// 负责读取灰度图像、提取指定的 (或全部 8 个) 位平面，
/// 并以 `<base>_k<N>` 命名逐个保存为二值图像。
///
/// # Arguments
///
/// * `args` - 包含输入图像与平面选择的 `PlanesArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取或解码输入图像。
/// * `--plane` 给出的序号不在 1..=8 范围内。
/// * 任一输出文件已存在且未指定 `--force` (在写入任何平面之前整体检查)，
///   或无法写入。
pub fn handle_planes(args: PlanesArgs) -> Result<()> {
    prepare_outdir(&args.outdir)?;

    let raster = load_raster(&args.image)?;
    let stem = file_stem(&args.image)?;
    let format = canonical_format_of(&args.image).unwrap_or(CanonicalFormat::Png);

    let planes = match args.plane {
        Some(index) => vec![extract_plane(&raster, index)?],
        None => extract_all_planes(&raster),
    };

    // 先整体检查所有目标路径，再落盘，避免冲突时留下残缺的平面集合。
    let destinations: Vec<PathBuf> = planes
        .iter()
        .map(|plane| {
            args.outdir
                .join(format!("{stem}_k{}.{}", plane.index(), format.extension()))
        })
        .collect();
    for dest in &destinations {
        ensure_writable(dest, args.force)?;
    }

    for (plane, dest) in planes.iter().zip(&destinations) {
        write_raster(plane.raster(), format.image_format(), dest, args.force)?;
        println!(
            "The bit plane has been successfully extracted and saved: {}",
            dest.to_string_lossy().green().bold()
        );
    }

    Ok(())
}

/// 处理 'Composite' 命令的执行逻辑。
///
/// 负责扫描目录中的位平面文件、按 base 聚组，并为每组渲染一张
/// 带 `k=<N>` 标注的 4x2 网格总览图，保存为 `<base>_composite.png`。
///
/// # Arguments
///
/// * `args` - 包含平面目录与可选字体路径的 `CompositeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取目录，或目录中没有符合命名约定的平面文件。
/// * 某个平面文件无法解码，或同组平面尺寸不一致。
/// * 输出文件已存在且未指定 `--force`，或无法写入。
pub fn handle_composite(args: CompositeArgs) -> Result<()> {
    prepare_outdir(&args.outdir)?;

    let paths = list_directory(&args.dir)?;
    let groups = group_plane_files(&paths);
    anyhow::ensure!(
        !groups.is_empty(),
        "No bit plane files (<base>_k<N>) were found in: {}",
        args.dir.to_string_lossy().red().bold()
    );

    let font = resolve_font(args.font.as_deref());

    for group in &groups {
        let image_group = load_group_planes(group)?;
        let overview = composite(&image_group, &group.base, &font).with_context(|| {
            format!(
                "Unable to render a composite for image group: {}",
                group.base.red().bold()
            )
        })?;

        let dest = args.outdir.join(format!("{}_composite.png", group.base));
        write_raster(&overview, ImageFormat::Png, &dest, args.force)?;
        println!(
            "The composite overview has been successfully rendered and saved: {}",
            dest.to_string_lossy().green().bold()
        );
    }

    Ok(())
}

/// 处理 'Reconstruct' 命令的执行逻辑。
///
/// 负责扫描目录中的位平面文件、按 base 聚组，并把每组平面按位权
/// 叠加还原成灰度图像，保存为 `<base>_restored.<ext>`。
///
/// # Arguments
///
/// * `args` - 包含平面目录与输出目录的 `ReconstructArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取目录，或目录中没有符合命名约定的平面文件。
/// * 某个平面文件无法解码，或同组平面尺寸不一致。
/// * 输出文件已存在且未指定 `--force`，或无法写入。
pub fn handle_reconstruct(args: ReconstructArgs) -> Result<()> {
    prepare_outdir(&args.outdir)?;

    let paths = list_directory(&args.dir)?;
    let groups = group_plane_files(&paths);
    anyhow::ensure!(
        !groups.is_empty(),
        "No bit plane files (<base>_k<N>) were found in: {}",
        args.dir.to_string_lossy().red().bold()
    );

    for group in &groups {
        let image_group = load_group_planes(group)?;
        let restored = reconstruct(&image_group.planes).with_context(|| {
            format!(
                "Unable to reconstruct image group: {}",
                group.base.red().bold()
            )
        })?;

        // 输出容器跟随序号最小的那个平面文件。
        let format = group
            .entries
            .first()
            .and_then(|entry| canonical_format_of(&entry.path))
            .unwrap_or(CanonicalFormat::Png);

        let dest = args
            .outdir
            .join(format!("{}_restored.{}", group.base, format.extension()));
        write_raster(&restored, format.image_format(), &dest, args.force)?;
        println!(
            "The image has been successfully reconstructed and saved: {}",
            dest.to_string_lossy().green().bold()
        );
    }

    Ok(())
}

/// 处理 'Histogram' 命令的执行逻辑。
///
/// 负责读取灰度图像、统计 256 bin 亮度直方图，并按
/// `hist_<base>_<role>.csv` 命名写出。角色与 base 优先取命令行参数，
/// 否则从文件名的 `_original` / `_stego` 后缀推断。
///
/// # Arguments
///
/// * `args` - 包含输入图像、角色与 base 覆写的 `HistogramArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取或解码输入图像。
/// * 既未指定 `--role`，又无法从文件名推断角色。
/// * 输出文件已存在且未指定 `--force`，或无法写入。
pub fn handle_histogram(args: HistogramArgs) -> Result<()> {
    prepare_outdir(&args.outdir)?;

    let raster = load_raster(&args.image)?;
    let stem = file_stem(&args.image)?;
    let parsed = parse_pair_stem(&stem);

    let role: PairRole = match (args.role, &parsed) {
        (Some(role), _) => role.into(),
        (None, Some(name)) => name.role,
        (None, None) => anyhow::bail!(
            "Unable to infer the histogram role from file name: {}. \nPass --role original or --role stego explicitly.",
            args.image.to_string_lossy().red().bold()
        ),
    };

    let base = match (args.base, parsed) {
        (Some(base), _) => base,
        (None, Some(name)) => name.base,
        (None, None) => stem,
    };

    let histogram = Histogram::of(&raster);
    let dest = args
        .outdir
        .join(format!("{HISTOGRAM_FILE_PREFIX}{base}_{role}.csv"));
    ensure_writable(&dest, args.force)?;
    fs::write(&dest, histogram.to_csv()).with_context(|| {
        format!(
            "Unable to write to target histogram file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The histogram has been successfully computed and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Compare' 命令的执行逻辑。
///
/// 负责扫描目录中的直方图 CSV、按 base 配对，并为每对打印逐 bin
/// 差异摘要 (最大绝对差与受影响的 bin 数)。缺少另一半的 base 会被
/// 跳过并给出警告。
///
/// # Arguments
///
/// * `args` - 包含直方图目录的 `CompareArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取目录，或目录中没有符合命名约定的直方图文件。
/// * 某个直方图文件无法读取或不满足 CSV 形状要求。
/// * 没有任何一对直方图完成了对比。
pub fn handle_compare(args: CompareArgs) -> Result<()> {
    let paths = list_directory(&args.dir)?;
    let pairings = pair_histogram_files(&paths);
    anyhow::ensure!(
        !pairings.is_empty(),
        "No histogram files (hist_<base>_<role>.csv) were found in: {}",
        args.dir.to_string_lossy().red().bold()
    );

    let mut compared = 0usize;
    for pairing in pairings {
        let pair = match pairing {
            Ok(pair) => pair,
            Err(error) => {
                println!("{} {}", "Skipped:".yellow(), error);
                continue;
            }
        };

        let original = read_histogram(&pair.original)?;
        let stego = read_histogram(&pair.stego)?;
        let diff = original.diff(&stego);

        println!(
            "{}: max |delta| = {}, affected bins = {}",
            pair.base.green().bold(),
            diff.max_abs_diff(),
            diff.affected_bins()
        );
        compared += 1;
    }

    anyhow::ensure!(
        compared > 0,
        "No complete histogram pair could be compared in: {}",
        args.dir.to_string_lossy().red().bold()
    );

    println!(
        "Compared {} histogram pair(s).",
        compared.to_string().green().bold()
    );

    Ok(())
}

/// 处理 'Fidelity' 命令的执行逻辑。
///
/// 负责读取两幅灰度图像并打印 MSE、PSNR 与全局 SSIM。
///
/// # Errors
///
/// 如果无法读取或解码任一图像，或两者尺寸不一致，将返回错误。
pub fn handle_fidelity(args: FidelityArgs) -> Result<()> {
    let original = load_raster(&args.original)?;
    let stego = load_raster(&args.stego)?;

    let mse = metrics::mse(&original, &stego).with_context(|| {
        format!(
            "Unable to compare {} with {}",
            args.original.to_string_lossy().red().bold(),
            args.stego.to_string_lossy().red().bold()
        )
    })?;
    let psnr = metrics::psnr(mse);
    let ssim = metrics::ssim(&original, &stego)?;

    println!("MSE:  {}", format!("{mse:.4}").green().bold());
    println!("PSNR: {} dB", format!("{psnr:.4}").green().bold());
    println!("SSIM: {}", format!("{ssim:.6}").green().bold());

    Ok(())
}

/// 读取并解码一个规范容器中的灰度图像。
fn load_raster(path: &Path) -> Result<Raster> {
    let bytes = fs::read(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    let raster = Raster::decode_canonical(&bytes).with_context(|| {
        format!(
            "Unable to decode image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    Ok(raster)
}

/// 编码并写出一个灰度图像，写入前执行覆盖保护检查。
fn write_raster(raster: &Raster, format: ImageFormat, dest: &Path, force: bool) -> Result<()> {
    ensure_writable(dest, force)?;

    let bytes = raster.encode_canonical(format).with_context(|| {
        format!(
            "Unable to encode image for: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    fs::write(dest, bytes).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    Ok(())
}

/// 归一化单个文件并返回输出路径。
fn normalize_one(input: &Path, args: &NormalizeArgs) -> Result<PathBuf> {
    let bytes = fs::read(input).with_context(|| {
        format!(
            "Unable to read image file: {}",
            input.to_string_lossy().red().bold()
        )
    })?;

    let raster = normalize::normalize(&bytes, args.width, args.height).with_context(|| {
        format!(
            "Unable to normalize image file: {}",
            input.to_string_lossy().red().bold()
        )
    })?;

    let stem = file_stem(input)?;
    let dest = args
        .outdir
        .join(format!("{stem}.{}", args.format.extension()));
    write_raster(&raster, args.format.image_format(), &dest, args.force)?;

    Ok(dest)
}

/// 逐个解码一组平面文件，还原成带位序号的内存分组。
fn load_group_planes(group: &PlaneGroup) -> Result<ImageGroup> {
    let mut planes = Vec::with_capacity(group.entries.len());
    for entry in &group.entries {
        let raster = load_raster(&entry.path)?;
        planes.push(BitPlane::new(entry.index, raster)?);
    }

    Ok(ImageGroup {
        base: group.base.clone(),
        planes,
    })
}

/// 读取并解析一个直方图 CSV 文件。
fn read_histogram(path: &Path) -> Result<Histogram> {
    let text = fs::read_to_string(path).with_context(|| {
        format!(
            "Unable to read histogram file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    let histogram = Histogram::from_csv(&text).with_context(|| {
        format!(
            "Unable to parse histogram file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    Ok(histogram)
}

/// 列出目录中的所有普通文件，按路径排序保证处理顺序稳定。
fn list_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).with_context(|| {
        format!(
            "Unable to read directory: {}",
            dir.to_string_lossy().red().bold()
        )
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| {
            format!(
                "Unable to read directory: {}",
                dir.to_string_lossy().red().bold()
            )
        })?;
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

/// 覆盖保护：目标已存在且未指定 `--force` 时拒绝写入。
fn ensure_writable(dest: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !dest.exists(),
        "Output file already exists: {}. Use --force to overwrite.",
        dest.to_string_lossy().red().bold()
    );
    Ok(())
}

fn prepare_outdir(outdir: &Path) -> Result<()> {
    fs::create_dir_all(outdir).with_context(|| {
        format!(
            "Unable to create output directory: {}",
            outdir.to_string_lossy().red().bold()
        )
    })
}

/// 从路径中取出 UTF-8 文件主干。
fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .with_context(|| {
            format!(
                "Unable to derive a file stem from: {}",
                path.to_string_lossy().red().bold()
            )
        })
}

fn canonical_format_of(path: &Path) -> Option<CanonicalFormat> {
    let extension = path.extension()?.to_str()?;
    if extension.eq_ignore_ascii_case("bmp") {
        Some(CanonicalFormat::Bmp)
    } else if extension.eq_ignore_ascii_case("png") {
        Some(CanonicalFormat::Png)
    } else {
        None
    }
}

/// 解析 `--font` 参数：未给出或加载失败时退回内置像素字体。
fn resolve_font(font: Option<&Path>) -> LabelFont {
    let Some(path) = font else {
        return LabelFont::Builtin;
    };

    match try_load_font(path) {
        Ok(font) => font,
        Err(error) => {
            println!(
                "{} {:#}",
                "Falling back to the builtin pixel font:".yellow(),
                error
            );
            LabelFont::Builtin
        }
    }
}

fn try_load_font(path: &Path) -> Result<LabelFont> {
    let bytes = fs::read(path).with_context(|| {
        format!(
            "Unable to read font file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    let font = LabelFont::from_bytes(bytes).with_context(|| {
        format!(
            "Unable to parse font file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    Ok(font)
}
