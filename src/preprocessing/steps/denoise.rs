use crate::error::OcrError;
use image::DynamicImage;
use imageproc::filter::gaussian_blur_f32;

/// Gaussian kernel extent in pixels
const KERNEL_SIZE: u32 = 5;

/// Sigma derived from the kernel extent: 0.3 * ((k - 1) / 2 - 1) + 0.8
const SIGMA: f32 = 0.3 * ((KERNEL_SIZE - 1) as f32 * 0.5 - 1.0) + 0.8;

/// Apply Gaussian smoothing to suppress scan noise
/// A 5-pixel kernel keeps stroke edges intact while flattening grain
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    let blurred = gaussian_blur_f32(&gray, SIGMA);
    Ok(DynamicImage::ImageLuma8(blurred))
}
