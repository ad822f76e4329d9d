use alloc::{sync::Arc, vec::Vec};
use core::{
    any::Any,
    fmt::{self, Debug, Formatter},
};

use crate::{
    any::{RcAny, TypeInfo},
    container::Container,
    errors::InjectErrorKind,
    inject::Injectable,
    lifecycle::Lifecycle,
};

pub(crate) type LifecycleAccessor = for<'a> fn(&'a (dyn Any + Send + Sync + 'static)) -> Option<&'a dyn Lifecycle>;
pub(crate) type Injector = fn(&Container, &mut (dyn Any + Send + Sync + 'static)) -> Result<(), InjectErrorKind>;

/// Type-erased service value stored and returned by the container.
///
/// Capabilities of the value (lifecycle, injection) are attached when the instance is built,
/// because they can't be discovered from an erased value later:
/// - [`Instance::new`] and [`Instance::from_arc`] create a plain instance
/// - [`Instance::managed`] and [`Instance::managed_arc`] attach the type's [`Lifecycle`] implementation
/// - [`Instance::injectable`] attaches the type's [`Injectable`] descriptor and, if it exposes one, its lifecycle
///
/// Cloning is cheap and clones share the same value.
#[derive(Clone)]
pub struct Instance {
    pub(crate) value: RcAny,
    type_info: TypeInfo,
    lifecycle: Option<LifecycleAccessor>,
    injector: Option<Injector>,
    dependencies: Arc<[&'static str]>,
}

impl Instance {
    #[inline]
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    #[inline]
    #[must_use]
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value,
            type_info: TypeInfo::of::<T>(),
            lifecycle: None,
            injector: None,
            dependencies: Arc::from(Vec::new()),
        }
    }

    #[inline]
    #[must_use]
    pub fn managed<T: Lifecycle + Send + Sync + 'static>(value: T) -> Self {
        Self::managed_arc(Arc::new(value))
    }

    #[inline]
    #[must_use]
    pub fn managed_arc<T: Lifecycle + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            lifecycle: Some(lifecycle_of::<T> as LifecycleAccessor),
            ..Self::from_arc(value)
        }
    }

    /// Creates an instance which fields can be populated by [`Container::inject_instance`].
    /// Qualifiers of the injection points are recorded as the instance dependencies.
    #[must_use]
    pub fn injectable<T: Injectable + Send + Sync>(value: T) -> Self {
        let dependencies = T::injection_points().iter().map(|point| point.qualifier).collect::<Vec<_>>();

        Self {
            lifecycle: Some(injectable_lifecycle_of::<T> as LifecycleAccessor),
            injector: Some(inject_erased::<T> as Injector),
            dependencies: Arc::from(dependencies),
            ..Self::new(value)
        }
    }

    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    #[inline]
    #[must_use]
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.clone().downcast().ok()
    }

    #[inline]
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    /// Returns `true` if both instances share the same value
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        core::ptr::eq(Arc::as_ptr(&self.value).cast::<()>(), Arc::as_ptr(&other.value).cast::<()>())
    }

    #[inline]
    #[must_use]
    pub fn lifecycle(&self) -> Option<&dyn Lifecycle> {
        self.lifecycle.and_then(|accessor| accessor(&*self.value))
    }

    #[inline]
    #[must_use]
    pub fn is_injectable(&self) -> bool {
        self.injector.is_some()
    }

    #[inline]
    #[must_use]
    pub fn dependencies(&self) -> &[&'static str] {
        &self.dependencies
    }

    #[inline]
    pub(crate) const fn injector(&self) -> Option<Injector> {
        self.injector
    }
}

impl<T: Send + Sync + 'static> From<Arc<T>> for Instance {
    #[inline]
    fn from(value: Arc<T>) -> Self {
        Self::from_arc(value)
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.type_info.name)
            .field("lifecycle", &self.lifecycle.is_some())
            .field("injectable", &self.injector.is_some())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

fn lifecycle_of<'a, T: Lifecycle + 'static>(value: &'a (dyn Any + Send + Sync + 'static)) -> Option<&'a dyn Lifecycle> {
    value.downcast_ref::<T>().map(|value| value as &dyn Lifecycle)
}

fn injectable_lifecycle_of<'a, T: Injectable>(value: &'a (dyn Any + Send + Sync + 'static)) -> Option<&'a dyn Lifecycle> {
    value.downcast_ref::<T>().and_then(Injectable::lifecycle)
}

fn inject_erased<T: Injectable>(container: &Container, value: &mut (dyn Any + Send + Sync + 'static)) -> Result<(), InjectErrorKind> {
    match value.downcast_mut::<T>() {
        Some(target) => container.inject_struct(target),
        None => Err(InjectErrorKind::NotStruct {
            type_info: TypeInfo::of::<T>(),
        }),
    }
}
