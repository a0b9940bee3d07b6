use anyhow::Ok;
use image::{GrayImage, Luma};
use lsb_lens::{
    cli::{
        CanonicalFormat, CompareArgs, CompositeArgs, FidelityArgs, HistogramArgs, NormalizeArgs,
        PlanesArgs, ReconstructArgs,
    },
    handler::{
        handle_compare, handle_composite, handle_fidelity, handle_histogram, handle_normalize,
        handle_planes, handle_reconstruct,
    },
};
use rand::RngCore;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机亮度的灰度测试图像
fn create_gray_image(path: &Path, width: u32, height: u32) {
    let mut img_buf = GrayImage::new(width, height);
    let mut raw_pixels = vec![0u8; (width * height) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    img_buf
        .pixels_mut()
        .zip(raw_pixels.iter())
        .for_each(|(pixel, &value)| {
            *pixel = Luma([value]);
        });

    img_buf.save(path).expect("Failed to create test image.");
}

/// 验证从归一化、平面分解到重建的完整流程，重建结果必须逐字节还原
#[test]
fn test_normalize_planes_reconstruct_round_trip() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let source_path = dir.path().join("lena.png");
    let norm_dir = dir.path().join("normalized");
    let planes_dir = dir.path().join("planes");
    let restored_dir = dir.path().join("restored");

    create_gray_image(&source_path, 64, 64);

    // 2. 归一化到 32x32
    handle_normalize(NormalizeArgs {
        input: source_path.clone(),
        width: 32,
        height: 32,
        format: CanonicalFormat::Png,
        outdir: norm_dir.clone(),
        force: false,
    })?;
    let normalized_path = norm_dir.join("lena.png");
    assert!(normalized_path.exists(), "Normalized image should be created.");

    // 3. 提取全部 8 个位平面
    handle_planes(PlanesArgs {
        image: normalized_path.clone(),
        plane: None,
        outdir: planes_dir.clone(),
        force: false,
    })?;
    for k in 1..=8 {
        assert!(
            planes_dir.join(format!("lena_k{k}.png")).exists(),
            "Bit plane {k} should be created."
        );
    }

    // 4. 从平面目录重建
    handle_reconstruct(ReconstructArgs {
        dir: planes_dir.clone(),
        outdir: restored_dir.clone(),
        force: false,
    })?;
    let restored_path = restored_dir.join("lena_restored.png");
    assert!(restored_path.exists(), "Restored image should be created.");

    // 5. 验证结果：同一编码器下重建文件应与归一化文件完全一致
    assert_eq!(
        fs::read(&normalized_path)?,
        fs::read(&restored_path)?,
        "Restored image must match the normalized original byte for byte."
    );

    Ok(())
}

/// 验证总览图生成：输出文件存在且画布为 4x2 个单元格
#[test]
fn test_composite_overview_layout() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let source_path = dir.path().join("scan.png");
    let planes_dir = dir.path().join("planes");
    let overview_dir = dir.path().join("overview");

    create_gray_image(&source_path, 32, 32);
    handle_planes(PlanesArgs {
        image: source_path,
        plane: None,
        outdir: planes_dir.clone(),
        force: false,
    })?;

    // 2. 渲染总览图 (未提供字体，走内置像素字体)
    handle_composite(CompositeArgs {
        dir: planes_dir,
        font: None,
        outdir: overview_dir.clone(),
        force: false,
    })?;

    // 3. 验证结果
    let overview_path = overview_dir.join("scan_composite.png");
    assert!(overview_path.exists(), "Composite overview should be created.");

    let overview = image::open(&overview_path)?.to_luma8();
    assert_eq!(
        overview.dimensions(),
        (32 * 4, 32 * 2),
        "Composite canvas must be a 4x2 grid of plane-sized cells."
    );

    Ok(())
}

/// 验证直方图生成 (角色从文件名推断) 与成对对比的完整流程
#[test]
fn test_histogram_and_compare_pipeline() -> anyhow::Result<()> {
    // 1. 准备环境：同一内容分别保存为 original 和 stego
    let dir = tempdir()?;
    let original_path = dir.path().join("pair_original.png");
    let stego_path = dir.path().join("pair_stego.png");
    let hist_dir = dir.path().join("histograms");

    create_gray_image(&original_path, 16, 16);
    fs::copy(&original_path, &stego_path)?;

    // 2. 为两幅图像分别生成直方图，角色均从后缀推断
    for image in [&original_path, &stego_path] {
        handle_histogram(HistogramArgs {
            image: image.clone(),
            role: None,
            base: None,
            outdir: hist_dir.clone(),
            force: false,
        })?;
    }

    let original_csv = hist_dir.join("hist_pair_original.csv");
    let stego_csv = hist_dir.join("hist_pair_stego.csv");
    assert!(original_csv.exists(), "Original histogram should be created.");
    assert!(stego_csv.exists(), "Stego histogram should be created.");

    // 3. 验证 CSV 形状：表头加 256 行数据
    let csv = fs::read_to_string(&original_csv)?;
    assert!(csv.starts_with("Brightness,Count\n"));
    assert_eq!(csv.lines().count(), 257);

    // 4. 成对对比应当成功
    handle_compare(CompareArgs { dir: hist_dir })?;

    Ok(())
}

/// 验证只有孤儿直方图时 compare 会失败，补齐另一半后成功
#[test]
fn test_compare_requires_a_complete_pair() -> anyhow::Result<()> {
    // 1. 准备环境：只生成 original 一半
    let dir = tempdir()?;
    let original_path = dir.path().join("solo_original.png");
    let hist_dir = dir.path().join("histograms");

    create_gray_image(&original_path, 16, 16);
    handle_histogram(HistogramArgs {
        image: original_path.clone(),
        role: None,
        base: None,
        outdir: hist_dir.clone(),
        force: false,
    })?;

    // 2. 孤儿会被跳过，没有可对比的配对时报错
    let result = handle_compare(CompareArgs {
        dir: hist_dir.clone(),
    });
    assert!(result.is_err(), "Compare should fail when no pair is complete.");
    if let Err(e) = result {
        assert!(e.to_string().contains("No complete histogram pair"));
    }

    // 3. 补齐 stego 一半后对比成功
    let stego_path = dir.path().join("solo_stego.png");
    fs::copy(&original_path, &stego_path)?;
    handle_histogram(HistogramArgs {
        image: stego_path,
        role: None,
        base: None,
        outdir: hist_dir.clone(),
        force: false,
    })?;
    handle_compare(CompareArgs { dir: hist_dir })?;

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let source_path = dir.path().join("guard.png");
    let planes_dir = dir.path().join("planes");

    create_gray_image(&source_path, 16, 16);

    // 2. 场景一：第一次提取成功，第二次因输出已存在而失败
    handle_planes(PlanesArgs {
        image: source_path.clone(),
        plane: Some(1),
        outdir: planes_dir.clone(),
        force: false,
    })?;
    assert!(planes_dir.join("guard_k1.png").exists());

    let result = handle_planes(PlanesArgs {
        image: source_path.clone(),
        plane: Some(1),
        outdir: planes_dir.clone(),
        force: false,
    });
    assert!(
        result.is_err(),
        "Execution should fail without --force when file exists."
    );
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：使用 --force 强制覆盖
    let result = handle_planes(PlanesArgs {
        image: source_path,
        plane: Some(1),
        outdir: planes_dir,
        force: true,
    });
    assert!(
        result.is_ok(),
        "Execution should succeed with --force when file exists."
    );

    Ok(())
}

/// 验证某个平面输出已存在时，planes 命令整体失败且不留下部分平面文件
#[test]
fn test_planes_conflict_leaves_no_partial_output() -> anyhow::Result<()> {
    // 1. 准备环境：预先占住 k5 的输出路径
    let dir = tempdir()?;
    let source_path = dir.path().join("photo.png");
    let planes_dir = dir.path().join("planes");

    create_gray_image(&source_path, 16, 16);
    fs::create_dir_all(&planes_dir)?;
    fs::write(planes_dir.join("photo_k5.png"), b"occupied")?;

    // 2. 不带 --force 提取全部平面：必须在写入任何文件之前失败
    let result = handle_planes(PlanesArgs {
        image: source_path.clone(),
        plane: None,
        outdir: planes_dir.clone(),
        force: false,
    });
    assert!(
        result.is_err(),
        "Execution should fail without --force when one destination exists."
    );
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }
    for k in [1, 2, 3, 4, 6, 7, 8] {
        assert!(
            !planes_dir.join(format!("photo_k{k}.png")).exists(),
            "No plane file should be written when any destination conflicts."
        );
    }

    // 3. 带 --force 重新执行：全部 8 个平面落盘
    handle_planes(PlanesArgs {
        image: source_path,
        plane: None,
        outdir: planes_dir.clone(),
        force: true,
    })?;
    for k in 1..=8 {
        assert!(
            planes_dir.join(format!("photo_k{k}.png")).exists(),
            "Bit plane {k} should exist after a forced run."
        );
    }

    Ok(())
}

/// 验证 `--plane` 的单平面选择和序号范围检查
#[test]
fn test_single_plane_selection_and_range_check() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let source_path = dir.path().join("pick.png");
    let planes_dir = dir.path().join("planes");

    create_gray_image(&source_path, 16, 16);

    // 2. 只提取第 3 个平面
    handle_planes(PlanesArgs {
        image: source_path.clone(),
        plane: Some(3),
        outdir: planes_dir.clone(),
        force: false,
    })?;
    assert!(planes_dir.join("pick_k3.png").exists());
    assert!(!planes_dir.join("pick_k1.png").exists());

    // 3. 超出范围的序号被拒绝
    let result = handle_planes(PlanesArgs {
        image: source_path,
        plane: Some(9),
        outdir: planes_dir,
        force: false,
    });
    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("out of range"));
    }

    Ok(())
}

/// 验证目录模式下归一化会跳过无法解码的文件，而不是整体失败
#[test]
fn test_normalize_directory_skips_undecodable_files() -> anyhow::Result<()> {
    // 1. 准备环境：一个可解码图像和一个纯文本文件
    let dir = tempdir()?;
    let input_dir = dir.path().join("input");
    let norm_dir = dir.path().join("normalized");
    fs::create_dir_all(&input_dir)?;

    create_gray_image(&input_dir.join("photo.png"), 64, 64);
    fs::write(input_dir.join("notes.txt"), "not an image at all")?;

    // 2. 第一次运行：文本文件被跳过，图像正常产出
    handle_normalize(NormalizeArgs {
        input: input_dir.clone(),
        width: 32,
        height: 32,
        format: CanonicalFormat::Bmp,
        outdir: norm_dir.clone(),
        force: false,
    })?;
    assert!(norm_dir.join("photo.bmp").exists());
    assert!(!norm_dir.join("notes.bmp").exists());

    // 3. 第二次运行：输出均已存在且未加 --force，没有任何文件被处理
    let result = handle_normalize(NormalizeArgs {
        input: input_dir,
        width: 32,
        height: 32,
        format: CanonicalFormat::Bmp,
        outdir: norm_dir,
        force: false,
    });
    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("No image in the directory could be normalized"));
    }

    Ok(())
}

/// 验证文件名没有角色后缀且未指定 `--role` 时直方图命令会拒绝执行
#[test]
fn test_histogram_role_inference_failure() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("plain.png");
    create_gray_image(&image_path, 16, 16);

    // 2. 无法推断角色时报错
    let result = handle_histogram(HistogramArgs {
        image: image_path.clone(),
        role: None,
        base: None,
        outdir: dir.path().to_path_buf(),
        force: false,
    });
    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Unable to infer the histogram role"));
    }

    // 3. 显式指定角色后成功，base 退回整个文件主干
    handle_histogram(HistogramArgs {
        image: image_path,
        role: Some(lsb_lens::cli::HistogramRole::Stego),
        base: None,
        outdir: dir.path().to_path_buf(),
        force: false,
    })?;
    assert!(dir.path().join("hist_plain_stego.csv").exists());

    Ok(())
}

/// 验证保真度命令对相同图像正常运行，对尺寸不一致的图像报错
#[test]
fn test_fidelity_reports_and_shape_check() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_path = dir.path().join("a.png");
    let twin_path = dir.path().join("b.png");
    let small_path = dir.path().join("small.png");

    create_gray_image(&original_path, 32, 32);
    fs::copy(&original_path, &twin_path)?;
    create_gray_image(&small_path, 16, 16);

    // 2. 相同图像：指标计算成功
    handle_fidelity(FidelityArgs {
        original: original_path.clone(),
        stego: twin_path,
    })?;

    // 3. 尺寸不一致：报错
    let result = handle_fidelity(FidelityArgs {
        original: original_path,
        stego: small_path,
    });
    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Unable to compare"));
    }

    Ok(())
}
