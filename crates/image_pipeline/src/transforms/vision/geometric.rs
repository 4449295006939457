use crate::error::PipelineError;
use crate::sample::{ImageShape, Sample};
use crate::transforms::Transform;
use anyhow::{ensure, Result};
use image::imageops::FilterType;
use ndarray::{arr1, Array2};

// ============================================================================
// ResizeImage
// ============================================================================

/// Resizes `image` to exactly `width x height` (aspect ratio is not kept)
/// and rescales `boxes` to match.
///
/// Boxes are absolute `[x1, y1, x2, y2]` pixel coordinates, so every row is
/// multiplied by `[sx, sy, sx, sy]` where `sx = width / original_width` and
/// `sy = height / original_height`.
///
/// # Filter Types
/// - `Nearest`: Nearest neighbour, fastest
/// - `Triangle`: Bilinear filter, the default
/// - `CatmullRom`: Bicubic sharpening
/// - `Gaussian`: Blurring/smoothing
/// - `Lanczos3`: Lanczos with window 3, highest quality re-sampling but slowest.
///
/// # Examples
/// ``` ignore
/// let resize = ResizeImage::new(256, 256)?.with_filter(FilterType::Lanczos3);
/// let sample = resize.apply(sample)?;
/// ```
#[derive(Debug, Clone)]
pub struct ResizeImage {
    width: u32,
    height: u32,
    filter: FilterType,
}

impl ResizeImage {
    /// Creates a new resize step with bilinear filtering.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        ensure!(
            width > 0 && height > 0,
            PipelineError::InvalidDimensions { width, height }
        );
        Ok(Self {
            width,
            height,
            filter: FilterType::Triangle,
        })
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Target `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn scale_boxes(&self, boxes: Array2<f32>, original: ImageShape) -> Result<Array2<f32>> {
        ensure!(
            boxes.ncols() == 4,
            PipelineError::InvalidBoxes {
                step: "ResizeImage",
                cols: boxes.ncols()
            }
        );
        let scale_x = self.width as f32 / original.width as f32;
        let scale_y = self.height as f32 / original.height as f32;
        Ok(boxes * &arr1(&[scale_x, scale_y, scale_x, scale_y]))
    }
}

impl Transform<Sample, Sample> for ResizeImage {
    fn apply(&self, mut sample: Sample) -> Result<Sample> {
        let image = sample.take_image("ResizeImage")?;
        let original = ImageShape::of(&image);
        ensure!(
            original.width > 0 && original.height > 0,
            PipelineError::InvalidDimensions {
                width: original.width as u32,
                height: original.height as u32
            }
        );

        if let Some(boxes) = sample.boxes.take() {
            sample.boxes = Some(self.scale_boxes(boxes, original)?);
        }
        sample.image = Some(image.resize_exact(self.width, self.height, self.filter));
        Ok(sample)
    }
}
