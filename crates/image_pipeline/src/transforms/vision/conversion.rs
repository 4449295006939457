use crate::sample::{ImageShape, Label, Sample};
use crate::tensor_sample::TensorSample;
use crate::transforms::Transform;
use anyhow::{bail, Context, Result};
use image::DynamicImage;
use log::debug;
use ndarray::{ArrayD, ArrayView3};
use tch::kind::Element;
use tch::Tensor;

// ============================================================================
// ToTensor
// ============================================================================

/// Converts a `Sample` into a model-ready [`TensorSample`].
///
/// The image goes from `H x W x C` to channel-first `C x H x W` and keeps its
/// pixel values (no rescaling). The label keeps its shape and its kind:
/// integer labels become i64 tensors, float labels f32 tensors.
///
/// Channel order is whatever [`ReadImage`](super::ReadImage) produced: RGB by
/// default, BGR with [`ColorMode::Bgr`](super::ColorMode::Bgr).
///
/// The output holds **only** `"image"` and `"label"`. Everything else
/// (`image_path`, `boxes`) is dropped via [`Sample::into_model_input`].
///
/// Channel Handling
/// | Input Format  | Output Shape |
/// |---------------|--------------|
/// | Grayscale (L) | `[1, H, W]`  |
/// | Gray + alpha  | `[2, H, W]`  |
/// | RGB           | `[3, H, W]`  |
/// | RGBA          | `[4, H, W]`  |
///
/// Tensor kind follows the bit depth:
/// | Pixel depth | Tensor kind |
/// |-------------|-------------|
/// | 8-bit       | `Uint8`     |
/// | 16-bit      | `Int` (i32, libtorch has no u16 element) |
/// | 32-bit float| `Float`     |
///
/// # Example
/// ```ignore
/// let pipeline = ReadImage::new().then(ToTensor);
/// let tensors = pipeline.apply(Sample::from_path("cat.jpg").with_label(label))?;
/// assert_eq!(tensors.get("image")?.size()[0], 3);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ToTensor;

impl ToTensor {
    /// `H x W x C` pixels -> contiguous `[C, H, W]` tensor, values unchanged.
    pub fn image_to_chw(image: DynamicImage) -> Result<Tensor> {
        let shape = ImageShape::of(&image);
        match &image {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_) => chw_tensor(image.as_bytes(), shape),
            DynamicImage::ImageLuma16(img) => chw_tensor(&widen(img.as_raw()), shape),
            DynamicImage::ImageLumaA16(img) => chw_tensor(&widen(img.as_raw()), shape),
            DynamicImage::ImageRgb16(img) => chw_tensor(&widen(img.as_raw()), shape),
            DynamicImage::ImageRgba16(img) => chw_tensor(&widen(img.as_raw()), shape),
            DynamicImage::ImageRgb32F(img) => chw_tensor(img.as_raw(), shape),
            DynamicImage::ImageRgba32F(img) => chw_tensor(img.as_raw(), shape),
            other => bail!("Unsupported pixel layout {:?}", other.color()),
        }
    }

    /// Any-rank label -> tensor of the same shape (i64 or f32).
    pub fn label_to_tensor(label: &Label) -> Result<Tensor> {
        match label {
            Label::Int(values) => array_to_tensor(values),
            Label::Float(values) => array_to_tensor(values),
        }
    }
}

fn widen(raw: &[u16]) -> Vec<i32> {
    raw.iter().map(|&v| i32::from(v)).collect()
}

fn chw_tensor<T: Element + Copy>(data: &[T], shape: ImageShape) -> Result<Tensor> {
    let hwc = ArrayView3::from_shape(shape.hwc(), data)
        .context("Pixel buffer does not match image dimensions")?;
    let chw = hwc.permuted_axes([2, 0, 1]);
    let chw = chw.as_standard_layout();
    let data = chw
        .as_slice()
        .context("Channel-first pixel buffer is not contiguous")?;

    Ok(Tensor::from_slice(data).reshape(&[
        shape.channels as i64,
        shape.height as i64,
        shape.width as i64,
    ]))
}

fn array_to_tensor<T: Element + Clone>(values: &ArrayD<T>) -> Result<Tensor> {
    let dims: Vec<i64> = values.shape().iter().map(|&d| d as i64).collect();
    let values = values.as_standard_layout();
    let data = values
        .as_slice()
        .context("Label buffer is not contiguous")?;
    Ok(Tensor::from_slice(data).reshape(dims.as_slice()))
}

impl Transform<Sample, TensorSample> for ToTensor {
    fn apply(&self, sample: Sample) -> Result<TensorSample> {
        let input = sample.into_model_input().context("ToTensor")?;

        let image = Self::image_to_chw(input.image)?;
        let label = Self::label_to_tensor(&input.label)?;
        debug!(
            "ToTensor: image {:?}, label {:?}",
            image.size(),
            label.size()
        );

        Ok(TensorSample::from_single("image", image).with_feature("label", label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage, Rgba};
    use ndarray::{arr0, arr1, arr2, Array2};
    use tch::Kind;

    // 3 wide, 2 tall, every channel distinct
    fn test_rgb_image() -> DynamicImage {
        let mut img = RgbImage::new(3, 2);
        for y in 0..2u32 {
            for x in 0..3u32 {
                let base = (y * 3 + x) as u8 * 10;
                img.put_pixel(x, y, Rgb([base, base + 1, base + 2]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_to_tensor_is_channel_first() -> Result<()> {
        let sample = Sample::from_image(test_rgb_image()).with_label(arr1(&[1i64]).into_dyn());
        let tensors = ToTensor.apply(sample)?;

        let image = tensors.get("image")?;
        assert_eq!(image.size(), vec![3, 2, 3]); // CHW
        assert_eq!(image.kind(), Kind::Uint8);

        let rgb = test_rgb_image().to_rgb8();
        for c in 0..3 {
            for y in 0..2 {
                for x in 0..3 {
                    let expected = rgb.get_pixel(x as u32, y as u32)[c as usize] as i64;
                    assert_eq!(image.int64_value(&[c, y, x]), expected);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_to_tensor_keeps_only_image_and_label() -> Result<()> {
        let sample = Sample::from_path("cat.png")
            .with_image(test_rgb_image())
            .with_label(arr1(&[4i64]).into_dyn())
            .with_boxes(arr2(&[[0.0f32, 0.0, 1.0, 1.0]]));

        let tensors = ToTensor.apply(sample)?;
        let mut names: Vec<_> = tensors.features().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["image", "label"]);
        Ok(())
    }

    #[test]
    fn test_label_keeps_shape() -> Result<()> {
        let scalar = ToTensor::label_to_tensor(&arr0(7i64).into_dyn().into())?;
        assert_eq!(scalar.size(), Vec::<i64>::new());
        assert_eq!(scalar.int64_value(&[]), 7);

        let matrix = Array2::from_shape_vec((2, 2), vec![1i64, 2, 3, 4])?.into_dyn();
        let matrix = ToTensor::label_to_tensor(&matrix.into())?;
        assert_eq!(matrix.size(), vec![2, 2]);
        assert_eq!(matrix.kind(), Kind::Int64);
        assert_eq!(matrix.int64_value(&[1, 0]), 3);

        // Transposed view: data must follow logical order, not memory order.
        let transposed = Array2::from_shape_vec((2, 2), vec![1i64, 2, 3, 4])?.reversed_axes();
        let t = ToTensor::label_to_tensor(&transposed.into_dyn().into())?;
        assert_eq!(t.int64_value(&[0, 1]), 3);
        Ok(())
    }

    #[test]
    fn test_float_label_stays_float() -> Result<()> {
        let sample = Sample::from_image(test_rgb_image())
            .with_label(arr2(&[[0.25f32, 0.5], [1.5, -2.0]]).into_dyn());
        let tensors = ToTensor.apply(sample)?;

        let label = tensors.get("label")?;
        assert_eq!(label.kind(), Kind::Float);
        assert_eq!(label.size(), vec![2, 2]);
        assert_eq!(label.double_value(&[0, 0]), 0.25);
        assert_eq!(label.double_value(&[1, 1]), -2.0);
        Ok(())
    }

    #[test]
    fn test_sixteen_bit_gray_keeps_values() -> Result<()> {
        let gray = ImageBuffer::<Luma<u16>, _>::from_pixel(4, 2, Luma([1000u16]));
        let tensor = ToTensor::image_to_chw(DynamicImage::ImageLuma16(gray))?;

        assert_eq!(tensor.size(), vec![1, 2, 4]);
        assert_eq!(tensor.kind(), Kind::Int);
        assert_eq!(tensor.int64_value(&[0, 1, 3]), 1000);
        Ok(())
    }

    #[test]
    fn test_sixteen_bit_rgba_keeps_alpha_and_range() -> Result<()> {
        let rgba = ImageBuffer::<Rgba<u16>, _>::from_raw(2, 1, vec![1u16, 2, 3, 4, 5, 6, 7, 65535])
            .unwrap();
        let tensor = ToTensor::image_to_chw(DynamicImage::ImageRgba16(rgba))?;

        assert_eq!(tensor.size(), vec![4, 1, 2]);
        assert_eq!(tensor.int64_value(&[0, 0, 1]), 5);
        assert_eq!(tensor.int64_value(&[3, 0, 0]), 4);
        assert_eq!(tensor.int64_value(&[3, 0, 1]), 65535);
        Ok(())
    }

    #[test]
    fn test_float_image_stays_float() -> Result<()> {
        let rgb = ImageBuffer::<Rgb<f32>, _>::from_pixel(1, 1, Rgb([0.1f32, 0.5, 0.9]));
        let tensor = ToTensor::image_to_chw(DynamicImage::ImageRgb32F(rgb))?;

        assert_eq!(tensor.size(), vec![3, 1, 1]);
        assert_eq!(tensor.kind(), Kind::Float);
        assert_eq!(tensor.double_value(&[1, 0, 0]), 0.5);
        Ok(())
    }

    #[test]
    fn test_grayscale_has_one_channel() -> Result<()> {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 2, Luma([9])));
        let tensor = ToTensor::image_to_chw(gray)?;
        assert_eq!(tensor.size(), vec![1, 2, 4]);
        Ok(())
    }

    #[test]
    fn test_to_tensor_requires_label() {
        let err = ToTensor
            .apply(Sample::from_image(test_rgb_image()))
            .unwrap_err();
        assert_eq!(err.to_string(), "ToTensor");
        assert_eq!(
            err.downcast_ref::<PipelineError>(),
            Some(&PipelineError::MissingKey {
                step: "into_model_input",
                key: "label"
            })
        );
    }
}
