use anyhow::{anyhow, Result};
use std::collections::HashMap;
use tch::Tensor;

/// The `TensorSample` struct is the model-ready form of a [`Sample`](crate::Sample).
///
/// It maps feature names to tensors. [`ToTensor`](crate::transforms::vision::ToTensor)
/// produces one holding exactly:
/// - `"image"`: `[C, H, W]` tensor (u8 for 8-bit images)
/// - `"label"`: i64 or f32 tensor with the label's shape
#[derive(Debug)]
pub struct TensorSample {
    pub features: HashMap<String, Tensor>,
}

/// Creates a shallow clone of the `TensorSample`
impl Clone for TensorSample {
    fn clone(&self) -> Self {
        let features = self
            .features
            .iter()
            .map(|(k, v)| (k.clone(), v.shallow_clone()))
            .collect();
        Self { features }
    }
}

impl TensorSample {
    pub fn new(features: HashMap<String, Tensor>) -> Self {
        Self { features }
    }

    /// Creates a `TensorSample` from a single `(feature_name, tensor)` pair.
    ///
    /// Chain with [`with_feature`](Self::with_feature) to add more features.
    pub fn from_single(name: impl Into<String>, tensor: Tensor) -> Self {
        Self {
            features: HashMap::from([(name.into(), tensor)]),
        }
    }

    /// Adds or overwrites a feature.
    pub fn with_feature(mut self, name: impl Into<String>, tensor: Tensor) -> Self {
        self.features.insert(name.into(), tensor);
        self
    }

    /// Returns a reference to the tensor by feature name.
    pub fn get(&self, feature: &str) -> Result<&Tensor> {
        self.features
            .get(feature)
            .ok_or_else(|| anyhow!("Feature {} not found", feature))
    }

    /// Returns an iterator over all feature names.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }
}
