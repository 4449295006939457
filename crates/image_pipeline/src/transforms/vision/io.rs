use crate::error::PipelineError;
use crate::sample::Sample;
use crate::transforms::Transform;
use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView, ImageReader};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

// ============================================================================
// LoadImage - file decoder
// ============================================================================

/// Decodes an image file from disk into a `DynamicImage`.
///
/// Uses buffered reads and format sniffing, so the file extension does not
/// have to match the content. With the `turbojpeg` feature, `.jpg`/`.jpeg`
/// files go through libjpeg-turbo first and fall back to the `image` decoder
/// if that fails.
///
/// # Example
/// ```ignore
/// let image = LoadImage::new().apply(PathBuf::from("photo.jpg"))?;
/// ```
#[derive(Debug, Clone)]
pub struct LoadImage {
    buffer_size: usize,
}

impl Default for LoadImage {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadImage {
    /// Creates a new image loader with an 8KB read buffer.
    pub fn new() -> Self {
        Self { buffer_size: 8192 }
    }

    /// Decodes JPEG files with TurboJPEG into RGB8.
    #[cfg(feature = "turbojpeg")]
    fn load_jpeg_turbo(&self, path: &Path) -> Result<DynamicImage> {
        use image::RgbImage;
        use turbojpeg::{Decompressor, Image, PixelFormat};

        let mut buffer = Vec::new();
        File::open(path)
            .and_then(|mut file| file.read_to_end(&mut buffer))
            .with_context(|| format!("Failed to read JPEG: {}", path.display()))?;

        let mut decompressor =
            Decompressor::new().context("Failed to create TurboJPEG decompressor")?;
        let header = decompressor
            .read_header(&buffer)
            .with_context(|| format!("Failed to read JPEG header: {}", path.display()))?;

        let (width, height) = (header.width, header.height);
        let mut rgb_data = vec![0u8; width * height * 3];
        let output = Image {
            pixels: rgb_data.as_mut_slice(),
            width,
            height,
            format: PixelFormat::RGB,
            pitch: width * 3,
        };
        decompressor
            .decompress(&buffer, output)
            .with_context(|| format!("Failed to decompress JPEG: {}", path.display()))?;

        let rgb = RgbImage::from_raw(width as u32, height as u32, rgb_data)
            .context("TurboJPEG output does not match its header dimensions")?;
        Ok(DynamicImage::ImageRgb8(rgb))
    }

    /// Decodes any format the `image` crate understands.
    fn load_standard_format(&self, path: &Path) -> Result<DynamicImage> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open image: {}", path.display()))?;

        let file_size = file.metadata()?.len() as usize;
        let mut reader = BufReader::with_capacity(self.buffer_size, file);
        let mut buffer = Vec::with_capacity(file_size);
        reader
            .read_to_end(&mut buffer)
            .with_context(|| format!("Failed to read image: {}", path.display()))?;

        ImageReader::new(Cursor::new(buffer))
            .with_guessed_format()?
            .decode()
            .with_context(|| format!("Failed to decode image: {}", path.display()))
    }

    #[cfg(feature = "turbojpeg")]
    fn is_jpeg_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg"))
    }

    fn load(&self, path: &Path) -> Result<DynamicImage> {
        #[cfg(feature = "turbojpeg")]
        if Self::is_jpeg_file(path) {
            return self.load_jpeg_turbo(path).or_else(|turbo_error| {
                log::warn!(
                    "TurboJPEG failed for {}, falling back to standard decoder: {:#}",
                    path.display(),
                    turbo_error
                );
                self.load_standard_format(path)
            });
        }
        self.load_standard_format(path)
    }
}

impl Transform<PathBuf, DynamicImage> for LoadImage {
    fn apply(&self, path: PathBuf) -> Result<DynamicImage> {
        self.load(&path)
    }
}

// ============================================================================
// ReadImage - sample step
// ============================================================================

/// How the decoded colour layout is handed to later steps.
///
/// Channel order defaults to RGB, which is what the `image` decoders
/// produce. Models trained on OpenCV-decoded data expect BGR; use
/// [`ColorMode::Bgr`] for those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Convert everything to 3-channel RGB8.
    #[default]
    Rgb,
    /// Convert to 3-channel 8-bit with the red and blue channels swapped.
    ///
    /// The result is still stored as `ImageRgb8`; only the channel meaning
    /// changes, so channel 0 holds blue.
    Bgr,
    /// Keep whatever the decoder produced (grayscale, RGBA, 16-bit, ...).
    Unchanged,
}

/// Decodes `image_path` into `image`.
///
/// Pixels come out in RGB order by default. Use
/// `with_color_mode(ColorMode::Bgr)` for BGR.
///
/// - Requires `image_path` unless `image` is already set.
/// - If `image` is already present the sample is returned untouched, so
///   applying the step twice is the same as applying it once.
/// - Decode failures propagate with the path in the error context.
///
/// # Example
/// ```ignore
/// let sample = ReadImage::new().apply(Sample::from_path("cat.jpg"))?;
/// assert!(sample.image.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReadImage {
    loader: LoadImage,
    color: ColorMode,
}

impl ReadImage {
    /// Reads images as RGB8.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads images in their native colour layout.
    pub fn unchanged() -> Self {
        Self {
            color: ColorMode::Unchanged,
            ..Self::default()
        }
    }

    pub fn with_color_mode(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color
    }
}

impl Transform<Sample, Sample> for ReadImage {
    fn apply(&self, mut sample: Sample) -> Result<Sample> {
        if sample.image.is_some() {
            return Ok(sample);
        }

        let path = sample.image_path.as_deref().ok_or(PipelineError::MissingKey {
            step: "ReadImage",
            key: "image_path",
        })?;

        let image = self.loader.load(path)?;
        let image = match (self.color, image) {
            (ColorMode::Rgb, img @ DynamicImage::ImageRgb8(_)) => img,
            (ColorMode::Rgb, img) => DynamicImage::ImageRgb8(img.to_rgb8()),
            (ColorMode::Bgr, img) => {
                let mut bgr = img.to_rgb8();
                bgr.pixels_mut().for_each(|pixel| pixel.0.swap(0, 2));
                DynamicImage::ImageRgb8(bgr)
            }
            (ColorMode::Unchanged, img) => img,
        };
        let (width, height) = image.dimensions();
        debug!(
            "decoded {} as {}x{} {:?}",
            path.display(),
            width,
            height,
            image.color()
        );

        sample.image = Some(image);
        Ok(sample)
    }
}

// ============================================================================
// Tests
// ============================================================================
