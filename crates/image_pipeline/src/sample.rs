use crate::error::PipelineError;
use anyhow::Result;
use image::{DynamicImage, GenericImageView};
use ndarray::{Array2, ArrayD};
use std::path::PathBuf;

/// The `Sample` struct represents a single record flowing through the
/// preprocessing pipeline, before it is turned into tensors.
///
/// Every recognized key is an optional field. Steps read and write only the
/// keys they document and leave the rest untouched:
/// - **`image_path`**: where [`ReadImage`](crate::transforms::vision::ReadImage) decodes from
/// - **`image`**: decoded pixels, logically `H x W x C`
/// - **`label`**: numeric label array of any rank, integer or float ([`Label`])
/// - **`boxes`**: `N x 4` bounding boxes as absolute `[x1, y1, x2, y2]`
///
/// # Examples:
/// - Raw detection record: `{image_path: "img/0001.jpg", label: [3, 7], boxes: [[10, 20, 50, 80], ...]}`
/// - After reading: `{image_path: ..., image: 480x640x3, label: ..., boxes: ...}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    pub image_path: Option<PathBuf>,
    pub image: Option<DynamicImage>,
    pub label: Option<Label>,
    pub boxes: Option<Array2<f32>>,
}

/// Numeric label array. Class ids stay integral, regression targets,
/// soft labels and keypoints stay floating point.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Int(ArrayD<i64>),
    Float(ArrayD<f32>),
}

impl Label {
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Int(values) => values.shape(),
            Self::Float(values) => values.shape(),
        }
    }
}

impl From<ArrayD<i64>> for Label {
    fn from(values: ArrayD<i64>) -> Self {
        Self::Int(values)
    }
}

impl From<ArrayD<f32>> for Label {
    fn from(values: ArrayD<f32>) -> Self {
        Self::Float(values)
    }
}

/// Logical `(height, width, channels)` layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl ImageShape {
    pub fn of(image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            height: height as usize,
            width: width as usize,
            channels: image.color().channel_count() as usize,
        }
    }

    /// Shape as an `[H, W, C]` triple.
    pub fn hwc(&self) -> [usize; 3] {
        [self.height, self.width, self.channels]
    }
}

/// The two features kept for the model. Produced by [`Sample::into_model_input`].
#[derive(Debug, Clone)]
pub struct ModelInput {
    pub image: DynamicImage,
    pub label: Label,
}

impl Sample {
    /// Creates a `Sample` that only knows where its image lives.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Creates a `Sample` from an already decoded image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image: Some(image),
            ..Self::default()
        }
    }

    /// Adds or overwrites the decoded image.
    pub fn with_image(mut self, image: DynamicImage) -> Self {
        self.image = Some(image);
        self
    }

    /// Adds or overwrites the label.
    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adds or overwrites the bounding boxes.
    pub fn with_boxes(mut self, boxes: Array2<f32>) -> Self {
        self.boxes = Some(boxes);
        self
    }

    /// Names of the keys currently present, in the order
    /// `image_path, image, label, boxes`.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::with_capacity(4);
        if self.image_path.is_some() {
            keys.push("image_path");
        }
        if self.image.is_some() {
            keys.push("image");
        }
        if self.label.is_some() {
            keys.push("label");
        }
        if self.boxes.is_some() {
            keys.push("boxes");
        }
        keys
    }

    /// Shape of the decoded image, if there is one.
    pub fn image_shape(&self) -> Option<ImageShape> {
        self.image.as_ref().map(ImageShape::of)
    }

    /// Moves the image out, failing with [`PipelineError::MissingKey`] on behalf of `step`.
    pub(crate) fn take_image(&mut self, step: &'static str) -> Result<DynamicImage> {
        self.image
            .take()
            .ok_or_else(|| PipelineError::MissingKey { step, key: "image" }.into())
    }

    /// Keeps `image` and `label` and drops every other key.
    ///
    /// This is the only place where a sample loses data: `image_path` and
    /// `boxes` do not survive.
    pub fn into_model_input(self) -> Result<ModelInput> {
        const STEP: &str = "into_model_input";
        let image = self.image.ok_or(PipelineError::MissingKey {
            step: STEP,
            key: "image",
        })?;
        let label = self.label.ok_or(PipelineError::MissingKey {
            step: STEP,
            key: "label",
        })?;
        Ok(ModelInput { image, label })
    }
}
