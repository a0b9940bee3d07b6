use crate::error::AnalysisError;
use crate::raster::Raster;

const MAX_PIXEL: f64 = 255.0;
const PSNR_CAP: f64 = 100.0;
// 全局 SSIM 的稳定常数: (0.01*255)^2 与 (0.03*255)^2。
const SSIM_C1: f64 = 6.5025;
const SSIM_C2: f64 = 58.5225;

pub fn mse(a: &Raster, b: &Raster) -> Result<f64, AnalysisError> {
    ensure_same_shape(a, b)?;

    let sum: f64 = a
        .pixels()
        .iter()
        .zip(b.pixels())
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum();

    Ok(sum / a.pixels().len() as f64)
}

pub fn psnr(mse: f64) -> f64 {
    if mse <= 0.0 {
        return PSNR_CAP;
    }
    10.0 * (MAX_PIXEL * MAX_PIXEL / mse).log10()
}

pub fn ssim(a: &Raster, b: &Raster) -> Result<f64, AnalysisError> {
    ensure_same_shape(a, b)?;

    let count = a.pixels().len();
    let n = count as f64;
    let mean_a = a.pixels().iter().map(|&p| f64::from(p)).sum::<f64>() / n;
    let mean_b = b.pixels().iter().map(|&p| f64::from(p)).sum::<f64>() / n;

    let mut var_a = 0.0;
    let mut var_b = 0.0;
    let mut covar = 0.0;
    for (&x, &y) in a.pixels().iter().zip(b.pixels()) {
        let dx = f64::from(x) - mean_a;
        let dy = f64::from(y) - mean_b;
        var_a += dx * dx;
        var_b += dy * dy;
        covar += dx * dy;
    }

    // 样本方差; 单像素图像退化为除 1。
    let denom = (count - 1).max(1) as f64;
    var_a /= denom;
    var_b /= denom;
    covar /= denom;

    let numerator = (2.0 * mean_a * mean_b + SSIM_C1) * (2.0 * covar + SSIM_C2);
    let denominator = (mean_a * mean_a + mean_b * mean_b + SSIM_C1) * (var_a + var_b + SSIM_C2);

    Ok(numerator / denominator)
}

fn ensure_same_shape(a: &Raster, b: &Raster) -> Result<(), AnalysisError> {
    if a.width() != b.width() || a.height() != b.height() {
        return Err(AnalysisError::ShapeMismatch(format!(
            "{}x{} vs {}x{}",
            a.width(),
            a.height(),
            b.width(),
            b.height()
        )));
    }
    Ok(())
}
