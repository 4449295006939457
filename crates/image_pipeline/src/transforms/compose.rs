use super::Transform;
use crate::sample::Sample;
use anyhow::{Context, Result};
use log::debug;

/// Boxed step that maps a `Sample` to a `Sample`.
pub type BoxedStep = Box<dyn Transform<Sample, Sample>>;

/// An ordered list of `Sample -> Sample` steps applied one after another.
///
/// Unlike [`Chain`](super::Chain), the steps are trait objects, so a
/// `Compose` can be assembled at runtime (e.g. from a
/// [`PipelineConfig`](crate::config::PipelineConfig)). The first failing step
/// aborts the run; its error is returned with the step index and name
/// attached. An empty `Compose` returns its input unchanged.
///
/// # Example
/// ```ignore
/// let pipeline = Compose::new()
///     .push(ReadImage::new())
///     .push(ResizeImage::new(224, 224)?)
///     .push(RandomFlip::new(FlipAxis::Horizontal))
///     .then(ToTensor);
/// let model_input = pipeline.apply(Sample::from_path("cat.jpg").with_label(label))?;
/// ```
#[derive(Default)]
pub struct Compose {
    steps: Vec<BoxedStep>,
}

impl Compose {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pipeline from already boxed steps.
    pub fn from_steps(steps: Vec<BoxedStep>) -> Self {
        Self { steps }
    }

    /// Appends a step at the end of the pipeline.
    pub fn push<T>(mut self, step: T) -> Self
    where
        T: Transform<Sample, Sample> + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    /// Appends every step of `other`, keeping their order.
    pub fn extend(mut self, other: Compose) -> Self {
        self.steps.extend(other.steps);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Names of the steps, in application order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }
}

impl std::fmt::Debug for Compose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compose")
            .field("steps", &self.step_names())
            .finish()
    }
}

impl Transform<Sample, Sample> for Compose {
    fn apply(&self, sample: Sample) -> Result<Sample> {
        self.steps
            .iter()
            .enumerate()
            .try_fold(sample, |sample, (index, step)| {
                let out = step
                    .apply(sample)
                    .with_context(|| format!("Pipeline step #{} ({}) failed", index, step.name()))?;
                debug!(
                    "step #{} {} -> keys {:?}, image {:?}",
                    index,
                    step.name(),
                    out.keys(),
                    out.image_shape().map(|s| s.hwc())
                );
                Ok(out)
            })
    }
}
