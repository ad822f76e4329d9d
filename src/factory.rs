use alloc::sync::Arc;

use crate::{instance::Instance, lifecycle::Lifecycle};

/// Producer of service instances.
///
/// A factory of a singleton is called once on registration,
/// a factory of a prototype is called on every resolution.
/// Returning `None` means the factory has nothing to provide.
pub trait Factory: Send + Sync + 'static {
    fn create(&self) -> Option<Instance>;
}

impl<F> Factory for F
where
    F: Fn() -> Option<Instance> + Send + Sync + 'static,
{
    #[inline]
    fn create(&self) -> Option<Instance> {
        self()
    }
}

pub(crate) type BoxedFactory = Arc<dyn Factory>;

/// Wrapper to create a factory that just returns passed value.
/// Every call returns a clone of the same instance.
#[inline]
#[must_use]
pub fn instance(val: impl Into<Instance>) -> impl Factory + Clone {
    let val = val.into();
    move || Some(val.clone())
}

/// Wrapper to create a factory from a constructor of a plain value.
/// The value is wrapped with [`Instance::new`], so its [`Lifecycle`] implementation isn't called,
/// use [`from_fn_managed`] for that.
#[inline]
#[must_use]
pub fn from_fn<T, F>(constructor: F) -> impl Factory
where
    T: Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    move || Some(Instance::new(constructor()))
}

/// Same as [`from_fn`], but the value is wrapped with [`Instance::managed`],
/// so post-construct of the value runs on every resolution
#[inline]
#[must_use]
pub fn from_fn_managed<T, F>(constructor: F) -> impl Factory
where
    T: Lifecycle + Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    move || Some(Instance::managed(constructor()))
}
