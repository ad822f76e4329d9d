use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::fmt::{self, Debug, Formatter};

use crate::{any::TypeInfo, instance::Instance, lifecycle::Lifecycle};

/// Structure which fields are populated from a container.
///
/// Usually derived with `#[derive(Injectable)]`:
/// ```rust,ignore
/// #[derive(Default, Injectable)]
/// struct UserService {
///     #[inject("user_repository", required)]
///     repository: Option<Arc<UserRepository>>,
///     #[inject("cache")]
///     cache: Option<Arc<Cache>>,
/// }
/// ```
pub trait Injectable: Sized + 'static {
    /// Fields to populate, in declaration order
    fn injection_points() -> Vec<InjectionPoint<Self>>;

    /// Lifecycle of the structure itself, called after its fields were populated
    #[inline]
    fn lifecycle(&self) -> Option<&dyn Lifecycle> {
        None
    }
}

/// Field type an injected instance can be stored in
pub trait Slot {
    /// Type the resolved instance must have
    fn expected() -> TypeInfo;

    fn accepts(instance: &Instance) -> bool;

    /// Stores the instance, called only if [`Slot::accepts`] returned `true` for it
    fn fill(&mut self, instance: &Instance);
}

impl<T: Send + Sync + 'static> Slot for Option<Arc<T>> {
    #[inline]
    fn expected() -> TypeInfo {
        TypeInfo::of::<T>()
    }

    #[inline]
    fn accepts(instance: &Instance) -> bool {
        instance.is::<T>()
    }

    #[inline]
    fn fill(&mut self, instance: &Instance) {
        *self = instance.downcast();
    }
}

/// Untyped slot, accepts an instance of any type
impl Slot for Option<Instance> {
    #[inline]
    fn expected() -> TypeInfo {
        TypeInfo::of::<Instance>()
    }

    #[inline]
    fn accepts(_instance: &Instance) -> bool {
        true
    }

    #[inline]
    fn fill(&mut self, instance: &Instance) {
        *self = Some(instance.clone());
    }
}

type Assign<T> = Box<dyn Fn(&mut T, &Instance) + Send + Sync>;

/// Field of `T` populated by the service registered under `qualifier`
pub struct InjectionPoint<T> {
    pub field: &'static str,
    pub qualifier: &'static str,
    pub required: bool,
    expected: TypeInfo,
    accepts: fn(&Instance) -> bool,
    assign: Assign<T>,
}

impl<T: 'static> InjectionPoint<T> {
    /// Creates an optional injection point, `project` returns the field slot of the target
    #[must_use]
    pub fn new<S: Slot + 'static>(field: &'static str, qualifier: &'static str, project: fn(&mut T) -> &mut S) -> Self {
        Self {
            field,
            qualifier,
            required: false,
            expected: S::expected(),
            accepts: S::accepts,
            assign: Box::new(move |target: &mut T, instance: &Instance| project(target).fill(instance)),
        }
    }

    #[inline]
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[inline]
    #[must_use]
    pub const fn expected(&self) -> TypeInfo {
        self.expected
    }

    #[inline]
    #[must_use]
    pub fn accepts(&self, instance: &Instance) -> bool {
        (self.accepts)(instance)
    }

    #[inline]
    pub(crate) fn assign(&self, target: &mut T, instance: &Instance) {
        (self.assign)(target, instance);
    }
}

impl<T> Debug for InjectionPoint<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionPoint")
            .field("field", &self.field)
            .field("qualifier", &self.qualifier)
            .field("required", &self.required)
            .field("expected", &self.expected.name)
            .finish_non_exhaustive()
    }
}
