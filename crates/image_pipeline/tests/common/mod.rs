use anyhow::Result;
use image::{DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Gradient test image with a red marker in the top-left corner.
pub fn marker_image(width: u32, height: u32) -> DynamicImage {
    let mut img = RgbImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            img.put_pixel(x, y, Rgb([0, (x * 255 / width) as u8, (y * 255 / height) as u8]));
        }
    }
    img.put_pixel(0, 0, Rgb([255, 0, 0]));
    DynamicImage::ImageRgb8(img)
}

/// Writes `marker_image` to `dir/name`; the format follows the extension.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> Result<PathBuf> {
    let path = dir.join(name);
    marker_image(width, height).save(&path)?;
    Ok(path)
}
