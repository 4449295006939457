//! Composable image preprocessing for ML data pipelines.
//!
//! A [`Sample`] record (image path, decoded image, label, boxes) flows
//! through an ordered list of steps, each implementing
//! [`Transform<Sample, Sample>`](transforms::Transform). [`ToTensor`] turns the
//! final record into a model-ready [`TensorSample`].
//!
//! ```ignore
//! use image_pipeline::prelude::*;
//!
//! let pipeline = Compose::new()
//!     .push(ReadImage::new())
//!     .push(ResizeImage::new(100, 100)?)
//!     .push(RandomFlip::with_seed(FlipAxis::Horizontal, 42))
//!     .then(ToTensor);
//!
//! let tensors = pipeline.apply(Sample::from_path("x.jpg").with_label(label))?;
//! ```

pub mod config;
pub mod error;
pub mod rng;
pub mod sample;
pub mod tensor_sample;
pub mod transforms;

pub use config::{PipelineConfig, StepConfig};
pub use error::PipelineError;
pub use sample::{ImageShape, Label, ModelInput, Sample};
pub use tensor_sample::TensorSample;
pub use transforms::vision::ToTensor;

/// Everything needed to assemble and run a pipeline.
pub mod prelude {
    pub use crate::config::{PipelineConfig, ResizeFilter, StepConfig};
    pub use crate::sample::{Label, Sample};
    pub use crate::tensor_sample::TensorSample;
    pub use crate::transforms::vision::{
        ColorMode, FlipAxis, RandomFlip, ReadImage, ResizeImage, ToTensor,
    };
    pub use crate::transforms::{Compose, Transform};
}
