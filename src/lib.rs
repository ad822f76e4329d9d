#![no_std]

extern crate alloc;

pub(crate) mod any;
pub(crate) mod aspect;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod descriptor;
pub(crate) mod errors;
pub(crate) mod factory;
pub(crate) mod inject;
pub(crate) mod instance;
pub(crate) mod lifecycle;
pub(crate) mod profile;
pub(crate) mod scope;

#[doc(hidden)]
pub mod macros_utils;
pub mod pointcut;

pub use any::TypeInfo;
pub use aspect::{Aspect, AspectKind, AspectManager, JoinPoint, MethodInfo, Value};
pub use config::Config;
pub use container::{Container, ContainerBuilder};
pub use descriptor::ServiceInfo;
pub use errors::{AspectErrorKind, CleanupErrorKind, InjectErrorKind, LifecycleErrorKind, RegisterErrorKind, ResolveErrorKind};
pub use factory::{from_fn, from_fn_managed, instance, Factory};
pub use inject::{Injectable, InjectionPoint, Slot};
pub use instance::Instance;
pub use lifecycle::{HookTarget, Lifecycle, LifecycleHook, LifecycleManager, Phase};
pub use profile::{Condition, Profile, ProfileCondition, ProfileManager};
pub use scope::Scope;

#[cfg(feature = "macros")]
pub use wirekit_macros::Injectable;
