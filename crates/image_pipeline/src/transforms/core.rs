use anyhow::{Context, Result};
use std::marker::PhantomData;

/// Defines the core `Transform` trait for composable preprocessing pipelines.
///
/// A `Transform<I, O>` converts an input of type `I` into an output of type
/// `O`. Configuration is fixed at construction, so `apply` takes `&self`.
/// Steps can be chained statically with `.then(...)`, or collected into a
/// [`Compose`](super::Compose) when every step maps `Sample -> Sample`.
///
/// Note: `then()` works only when:
/// 1. **Types align**: `self: Transform<I, O>`, `next: Transform<O, M>`
/// 2. **Owned**: `Self::Sized` (no trait objects, must be concrete)
/// 3. **Thread-safe**: intermediate and output types must be `Send`
pub trait Transform<I, O>: Send + Sync {
    /// Applies the transformation to the input
    fn apply(&self, input: I) -> Result<O>;

    /// Human-readable step name used in error context and logs.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    #[inline]
    fn then<T, M>(self, next: T) -> Chain<Self, T, O>
    where
        Self: Sized,
        T: Transform<O, M>,
        O: Send,
        M: Send,
    {
        Chain {
            first: self,
            second: next,
            _marker: PhantomData,
        }
    }
}

/// Last path segment of a type name, generics stripped
/// (`image_pipeline::transforms::vision::ResizeImage` -> `ResizeImage`).
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A chain of two transforms (`A` -> `B`)
/// - `PhantomData<M>` enforces intermediate type alignment.
#[derive(Debug)]
pub struct Chain<A, B, M> {
    first: A,
    second: B,
    _marker: PhantomData<fn() -> M>,
}

impl<A, B, M> Chain<A, B, M> {
    /// Creates a new transform chain.
    /// Use [`Transform::then`] for better ergonomics.
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            _marker: PhantomData,
        }
    }
}

impl<I, M, O, A, B> Transform<I, O> for Chain<A, B, M>
where
    A: Transform<I, M>,
    B: Transform<M, O>,
    M: Send,
{
    fn apply(&self, input: I) -> Result<O> {
        let (first, second) = (self.first.name(), self.second.name());
        let mid = self.first.apply(input).with_context(|| {
            format!("Transform chain failed at {first} ({first} → {second})")
        })?;
        self.second.apply(mid).with_context(|| {
            format!("Transform chain failed at {second} ({first} → {second})")
        })
    }
}
