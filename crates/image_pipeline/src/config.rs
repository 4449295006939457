//! src/config.rs
//!
//! Declarative pipeline descriptions.
//!
//! A `PipelineConfig` lists the steps of a [`Compose`] pipeline as plain data,
//! so a pipeline can live in a JSON file next to the rest of a training setup
//! and be rebuilt from it.
//!
//! Example:
//! ```json
//! {
//!   "steps": [
//!     { "type": "read" },
//!     { "type": "resize", "width": 224, "height": 224, "filter": "lanczos3" },
//!     { "type": "random_flip", "axis": "horizontal", "seed": 7 }
//!   ]
//! }
//! ```
//!
//! ```ignore
//! let pipeline = PipelineConfig::from_json(&text)?.build()?.then(ToTensor);
//! ```

use crate::transforms::vision::{ColorMode, FlipAxis, RandomFlip, ReadImage, ResizeImage};
use crate::transforms::Compose;
use anyhow::{Context, Result};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Ordered list of step descriptions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub steps: Vec<StepConfig>,
}

/// One step of a [`PipelineConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepConfig {
    Read {
        #[serde(default)]
        color: ColorMode,
    },
    Resize {
        width: u32,
        height: u32,
        #[serde(default)]
        filter: ResizeFilter,
    },
    RandomFlip {
        #[serde(default)]
        axis: FlipAxis,
        /// Unseeded flips draw from the thread RNG.
        #[serde(default)]
        seed: Option<u64>,
    },
}

/// Serializable names for `image::imageops::FilterType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid pipeline configuration")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize pipeline configuration")
    }

    /// Appends a step description.
    pub fn step(mut self, step: StepConfig) -> Self {
        self.steps.push(step);
        self
    }

    /// Instantiates every step, in order. Parameters are validated here, so a
    /// config that builds will not fail on construction-time checks later.
    pub fn build(&self) -> Result<Compose> {
        self.steps
            .iter()
            .enumerate()
            .try_fold(Compose::new(), |pipeline, (index, step)| {
                let pipeline = match *step {
                    StepConfig::Read { color } => {
                        pipeline.push(ReadImage::new().with_color_mode(color))
                    }
                    StepConfig::Resize {
                        width,
                        height,
                        filter,
                    } => {
                        let resize = ResizeImage::new(width, height)
                            .with_context(|| format!("Invalid config for step #{}", index))?;
                        pipeline.push(resize.with_filter(filter.into()))
                    }
                    StepConfig::RandomFlip { axis, seed } => pipeline.push(match seed {
                        Some(seed) => RandomFlip::with_seed(axis, seed),
                        None => RandomFlip::new(axis),
                    }),
                };
                Ok(pipeline)
            })
    }
}
