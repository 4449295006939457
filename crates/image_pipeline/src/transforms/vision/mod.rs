//! src/transforms/vision/mod.rs
//!
//! Vision steps that operate on [`Sample`](crate::Sample) records.
//!
//! # Module Organization
//!
//! ```text
//! transforms/vision/
//! ├── io.rs            → Decoding (ReadImage, LoadImage)
//! ├── geometric.rs     → Spatial transformations (ResizeImage)
//! ├── augmentation.rs  → Random augmentation (RandomFlip)
//! └── conversion.rs    → Sample → TensorSample (ToTensor)
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use crate::transforms::{Compose, Transform};
//! use crate::transforms::vision::{FlipAxis, RandomFlip, ReadImage, ResizeImage, ToTensor};
//!
//! let pipeline = Compose::new()
//!     .push(ReadImage::new())
//!     .push(ResizeImage::new(224, 224)?)
//!     .push(RandomFlip::new(FlipAxis::Horizontal))
//!     .then(ToTensor);
//! ```

pub mod augmentation;
pub mod conversion;
pub mod geometric;
pub mod io;

pub use augmentation::{FlipAxis, RandomFlip};
pub use conversion::ToTensor;
pub use geometric::ResizeImage;
pub use io::{ColorMode, LoadImage, ReadImage};
