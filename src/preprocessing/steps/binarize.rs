use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};

/// Foreground value for pixels at or above the threshold
const FOREGROUND: u8 = 255;
/// Background value for pixels below the threshold
const BACKGROUND: u8 = 0;

/// Apply Otsu global thresholding
/// Maps every pixel to 0 or 255 using the histogram-derived threshold
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    let level = otsu_level(&gray);

    let binary = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] >= level {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    });

    Ok(DynamicImage::ImageLuma8(binary))
}

/// Compute the Otsu threshold over a 256-bin intensity histogram.
///
/// Picks the split maximizing between-class variance. Candidate splits
/// with an empty class are skipped, so a constant-intensity image falls
/// back to its single occupied bin instead of dividing by zero.
pub fn otsu_level(img: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in img.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total = (img.width() as u64 * img.height() as u64) as f64;
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(value, &count)| value as f64 * count as f64)
        .sum();

    let mut best_level = 0usize;
    let mut best_variance = -1.0f64;
    let mut weight_below = 0.0f64;
    let mut sum_below = 0.0f64;

    // Split at t: class 0 is [0, t), class 1 is [t, 255]
    for t in 1..=255usize {
        let bin = (t - 1) as f64;
        weight_below += histogram[t - 1] as f64;
        sum_below += bin * histogram[t - 1] as f64;

        let weight_above = total - weight_below;
        if weight_below == 0.0 || weight_above == 0.0 {
            continue;
        }

        let mean_below = sum_below / weight_below;
        let mean_above = (weighted_total - sum_below) / weight_above;
        let variance =
            weight_below * weight_above * (mean_below - mean_above) * (mean_below - mean_above);

        if variance > best_variance {
            best_variance = variance;
            best_level = t;
        }
    }

    if best_variance < 0.0 {
        // Degenerate histogram: every pixel shares one bin
        return histogram
            .iter()
            .position(|&count| count > 0)
            .unwrap_or(0) as u8;
    }

    best_level as u8
}
