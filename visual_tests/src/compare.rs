use crate::{Result, VisualTestError};
use image::{Rgba, RgbaImage};
use image_compare::Algorithm;
use std::path::Path;

/// Channel difference above which a pixel counts as changed
const PIXEL_TOLERANCE: u8 = 10;

/// Result of comparing two images
pub struct CompareResult {
    /// SSIM similarity score from 0.0 to 1.0
    pub similarity: f64,
    /// Largest difference in any channel, alpha included
    pub max_difference: u8,
    /// Pixels differing by more than the tolerance
    pub differing_pixels: usize,
}

fn load_pair(reference: &Path, rendered: &Path) -> Result<(RgbaImage, RgbaImage)> {
    let reference = image::open(reference)?.to_rgba8();
    let rendered = image::open(rendered)?.to_rgba8();

    if reference.dimensions() != rendered.dimensions() {
        return Err(VisualTestError::Compare(format!(
            "Image dimensions don't match: reference {:?} vs rendered {:?}",
            reference.dimensions(),
            rendered.dimensions()
        )));
    }

    Ok((reference, rendered))
}

/// Compare a rendered image against its reference.
///
/// SSIM runs on RGB; alpha only feeds the per-pixel statistics, since
/// outline edges are mostly partial coverage.
pub fn compare_images(reference: &Path, rendered: &Path) -> Result<CompareResult> {
    let (reference, rendered) = load_pair(reference, rendered)?;

    let ref_rgb = image::DynamicImage::ImageRgba8(reference.clone()).to_rgb8();
    let ren_rgb = image::DynamicImage::ImageRgba8(rendered.clone()).to_rgb8();

    let result =
        image_compare::rgb_similarity_structure(&Algorithm::MSSIMSimple, &ref_rgb, &ren_rgb)
            .map_err(|e| VisualTestError::Compare(format!("SSIM comparison failed: {}", e)))?;

    let mut max_difference = 0;
    let mut differing_pixels = 0;
    for (a, b) in reference.pixels().zip(rendered.pixels()) {
        let diff = pixel_difference(a, b);
        max_difference = max_difference.max(diff);
        if diff > PIXEL_TOLERANCE {
            differing_pixels += 1;
        }
    }

    Ok(CompareResult {
        similarity: result.score,
        max_difference,
        differing_pixels,
    })
}

/// Write an image highlighting where `rendered` departs from `reference`
pub fn generate_diff_image(reference: &Path, rendered: &Path, output: &Path) -> Result<()> {
    let (reference, rendered) = load_pair(reference, rendered)?;

    let diff_img = RgbaImage::from_fn(reference.width(), reference.height(), |x, y| {
        let ref_pixel = reference.get_pixel(x, y);
        let ren_pixel = rendered.get_pixel(x, y);
        let diff = pixel_difference(ref_pixel, ren_pixel);

        if diff > PIXEL_TOLERANCE {
            let intensity = (diff as f32 / 255.0 * 200.0 + 55.0) as u8;
            // Red for colour changes, yellow when coverage changed too
            if ref_pixel[3] != ren_pixel[3] {
                Rgba([intensity, intensity, 0, 255])
            } else {
                Rgba([intensity, 0, 0, 255])
            }
        } else {
            Rgba([ren_pixel[0] / 3, ren_pixel[1] / 3, ren_pixel[2] / 3, 255])
        }
    });

    diff_img.save(output)?;
    Ok(())
}

/// Maximum channel difference between two pixels, alpha included
fn pixel_difference(a: &Rgba<u8>, b: &Rgba<u8>) -> u8 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(x, y)| x.abs_diff(*y))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_difference_includes_alpha() {
        assert_eq!(pixel_difference(&Rgba([10, 10, 10, 255]), &Rgba([10, 10, 10, 0])), 255);
        assert_eq!(pixel_difference(&Rgba([10, 20, 30, 40]), &Rgba([12, 18, 30, 40])), 2);
    }
}
