use crate::error::OcrError;
use image::{DynamicImage, GrayImage, ImageBuffer, Pixel};

/// Angles below this are treated as already straight
const MIN_CORRECTABLE_DEGREES: f32 = 0.1;

/// Deskew image by detecting and correcting rotation
/// Uses a Radon-style projection sweep to find the text-line angle
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    let angle = estimate_skew(&image);

    if angle.abs() < MIN_CORRECTABLE_DEGREES {
        return Ok(image);
    }

    Ok(correct_skew(&image, angle))
}

/// Estimate the skew angle of text lines, in degrees.
///
/// Sweeps projection angles over [0, 180) and scores each candidate by the
/// RMS energy of its line-integral profile; text rows produce a sharply
/// peaked profile when the integration direction runs along the baselines.
/// The winning angle theta maps to a signed skew via `-(90 - theta)`, where
/// positive skew means the content is tilted clockwise. Degenerate images
/// (all-foreground or all-background) estimate 0.
pub fn estimate_skew(image: &DynamicImage) -> f32 {
    let gray = image.to_luma8();
    let ink = ink_offsets(&gray);

    if ink.is_empty() {
        return 0.0;
    }

    let (width, height) = gray.dimensions();
    let (w, h) = (width as f64, height as f64);
    let diagonal = (w * w + h * h).sqrt().ceil() as usize + 1;
    let half = diagonal as f32 / 2.0;

    let mut best_theta = 90.0_f32;
    let mut best_energy = f64::MIN;

    for theta in 0..180u32 {
        let (sin, cos) = (theta as f32).to_radians().sin_cos();

        let mut profile = vec![0.0f32; diagonal];
        for &(dx, dy) in &ink {
            let rho = dx * cos + dy * sin + half;
            let bin = (rho.round() as usize).min(diagonal - 1);
            profile[bin] += 1.0;
        }

        let energy = profile
            .iter()
            .map(|&v| (v as f64) * (v as f64))
            .sum::<f64>()
            / diagonal as f64;

        if energy > best_energy {
            best_energy = energy;
            best_theta = theta as f32;
        }
    }

    -(90.0 - best_theta)
}

/// Rotate the content back to horizontal given a detected skew angle.
///
/// Applies the inverse of the detected tilt about the image center,
/// resampling bicubically. The canvas keeps its original dimensions, so
/// extreme angles may clip corners.
pub fn correct_skew(image: &DynamicImage, angle: f32) -> DynamicImage {
    rotate_about_center(image, -angle)
}

/// Rotate image content by `degrees` (positive is clockwise) about the
/// center, replicating border pixels so no synthetic background appears.
pub fn rotate_about_center(image: &DynamicImage, degrees: f32) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(img) => DynamicImage::ImageLuma8(rotate_buffer(img, degrees)),
        DynamicImage::ImageRgb8(img) => DynamicImage::ImageRgb8(rotate_buffer(img, degrees)),
        other => DynamicImage::ImageRgb8(rotate_buffer(&other.to_rgb8(), degrees)),
    }
}

/// Collect centered offsets of ink pixels for the projection sweep.
///
/// The image is reduced to two levels first (median threshold, unless it
/// already is two-level); ink is the minority level, so the profile energy
/// tracks text structure rather than the page background. Returns an empty
/// vector for degenerate images.
fn ink_offsets(gray: &GrayImage) -> Vec<(f32, f32)> {
    let (width, height) = gray.dimensions();
    let total = (width as u64) * (height as u64);

    let two_level = gray.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255);
    let level = if two_level {
        255
    } else {
        median_intensity(gray)
    };

    let above: u64 = gray
        .pixels()
        .filter(|p| u32::from(p.0[0]) >= level)
        .count() as u64;
    let below = total - above;

    if above == 0 || below == 0 {
        return Vec::new();
    }
    let ink_is_above = above <= below;

    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;

    let mut offsets = Vec::with_capacity(above.min(below) as usize);
    for (x, y, pixel) in gray.enumerate_pixels() {
        if (u32::from(pixel.0[0]) >= level) == ink_is_above {
            offsets.push((x as f32 - cx, y as f32 - cy));
        }
    }
    offsets
}

/// Median intensity from the 256-bin histogram
fn median_intensity(gray: &GrayImage) -> u32 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total = (gray.width() as u64) * (gray.height() as u64);
    let mut seen = 0u64;
    for (value, &count) in histogram.iter().enumerate() {
        seen += count;
        if seen * 2 >= total {
            return value as u32;
        }
    }
    255
}

fn rotate_buffer<P>(img: &ImageBuffer<P, Vec<u8>>, degrees: f32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = img.dimensions();
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let (sin, cos) = degrees.to_radians().sin_cos();

    ImageBuffer::from_fn(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        // Inverse map: rotate the destination point back into the source
        let src_x = cos * dx + sin * dy + cx;
        let src_y = -sin * dx + cos * dy + cy;
        sample_bicubic(img, src_x, src_y)
    })
}

/// Catmull-Rom bicubic sample with edge replication
fn sample_bicubic<P>(img: &ImageBuffer<P, Vec<u8>>, x: f32, y: f32) -> P
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = img.dimensions();
    let x0 = x.floor();
    let y0 = y.floor();
    let wx = cubic_weights(x - x0);
    let wy = cubic_weights(y - y0);

    let channels = P::CHANNEL_COUNT as usize;
    let mut accum = [0.0f32; 4];

    for (j, &row_weight) in wy.iter().enumerate() {
        let sy = clamp_index(y0 as i64 + j as i64 - 1, height);
        for (i, &col_weight) in wx.iter().enumerate() {
            let sx = clamp_index(x0 as i64 + i as i64 - 1, width);
            let weight = row_weight * col_weight;
            let pixel = img.get_pixel(sx, sy);
            for (c, value) in pixel.channels().iter().enumerate() {
                accum[c] += weight * *value as f32;
            }
        }
    }

    let mut out = [0u8; 4];
    for c in 0..channels {
        out[c] = accum[c].round().clamp(0.0, 255.0) as u8;
    }
    *P::from_slice(&out[..channels])
}

/// Catmull-Rom weights for the four taps around a fractional offset
fn cubic_weights(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        0.5 * (-t3 + 2.0 * t2 - t),
        0.5 * (3.0 * t3 - 5.0 * t2 + 2.0),
        0.5 * (-3.0 * t3 + 4.0 * t2 + t),
        0.5 * (t3 - t2),
    ]
}

fn clamp_index(value: i64, size: u32) -> u32 {
    value.clamp(0, size as i64 - 1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    /// White page with black horizontal stripes, like text lines
    fn line_image() -> DynamicImage {
        let mut img = GrayImage::from_pixel(240, 160, Luma([255]));
        for stripe in 0..6u32 {
            let top = 25 + stripe * 20;
            for y in top..top + 3 {
                for x in 20..220 {
                    img.put_pixel(x, y, Luma([0]));
                }
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_estimate_straight_lines_near_zero() {
        let angle = estimate_skew(&line_image());
        assert!(angle.abs() <= 1.0, "Expected ~0 degrees, got {}", angle);
    }

    #[test]
    fn test_estimate_recovers_injected_angles() {
        for injected in [-10.0f32, -5.0, 5.0, 10.0] {
            let rotated = rotate_about_center(&line_image(), injected);
            let estimate = estimate_skew(&rotated);
            assert!(
                (estimate - injected).abs() <= 3.0,
                "Injected {} degrees, estimated {}",
                injected,
                estimate
            );
        }
    }

    #[test]
    fn test_correct_skew_round_trip() {
        let straight = estimate_skew(&line_image());

        let tilted = rotate_about_center(&line_image(), 7.0);
        let corrected = correct_skew(&tilted, estimate_skew(&tilted));
        let residual = estimate_skew(&corrected);

        assert!(
            (residual - straight).abs() <= 2.0,
            "Expected residual near {}, got {}",
            straight,
            residual
        );
    }

    #[test]
    fn test_estimate_degenerate_images_return_zero() {
        let uniform = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 50, Luma([128])));
        assert_eq!(estimate_skew(&uniform), 0.0);

        let black = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 50, Luma([0])));
        assert_eq!(estimate_skew(&black), 0.0);

        let white = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 50, Luma([255])));
        assert_eq!(estimate_skew(&white), 0.0);
    }

    #[test]
    fn test_rotation_preserves_dimensions() {
        let rotated = rotate_about_center(&line_image(), 12.5);
        assert_eq!(rotated.width(), 240);
        assert_eq!(rotated.height(), 160);
    }

    #[test]
    fn test_rotation_replicates_borders() {
        // A white page must stay white in the corners after rotation
        let white = DynamicImage::ImageLuma8(GrayImage::from_pixel(80, 60, Luma([255])));
        let rotated = rotate_about_center(&white, 15.0).to_luma8();

        assert_eq!(rotated.get_pixel(0, 0).0[0], 255);
        assert_eq!(rotated.get_pixel(79, 0).0[0], 255);
        assert_eq!(rotated.get_pixel(0, 59).0[0], 255);
        assert_eq!(rotated.get_pixel(79, 59).0[0], 255);
    }

    #[test]
    fn test_apply_skips_negligible_angles() {
        let img = line_image();
        let result = apply(img.clone()).unwrap();
        // Straight input comes back untouched
        assert_eq!(result.to_luma8().as_raw(), img.to_luma8().as_raw());
    }
}
