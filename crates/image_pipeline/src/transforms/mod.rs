pub mod compose;
pub mod core;
pub mod vision;

pub use compose::{BoxedStep, Compose};
pub use self::core::{Chain, Transform};
