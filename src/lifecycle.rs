use alloc::{string::String, sync::Arc, vec::Vec};
use core::{
    any::Any,
    fmt::{self, Debug, Display, Formatter},
};
use tracing::debug;

use crate::{any::TypeInfo, errors::LifecycleErrorKind, instance::Instance};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    PostConstruct,
    PreDestroy,
}

impl Phase {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Phase::PostConstruct => "post-construct",
            Phase::PreDestroy => "pre-destroy",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability of a service to take part in its own lifecycle.
///
/// [`Lifecycle::post_construct`] is called after the service is created (and injected, if it is injectable),
/// [`Lifecycle::pre_destroy`] is called on cleanup of the container for singletons.
pub trait Lifecycle {
    fn post_construct(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn pre_destroy(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Service passed to a lifecycle hook
pub struct HookTarget<'a> {
    qualifier: Option<&'a str>,
    type_info: TypeInfo,
    value: &'a dyn Any,
}

impl<'a> HookTarget<'a> {
    #[inline]
    #[must_use]
    pub(crate) fn new(qualifier: Option<&'a str>, instance: &'a Instance) -> Self {
        Self {
            qualifier,
            type_info: instance.type_info(),
            value: &*instance.value,
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn from_value<T: 'static>(value: &'a T) -> Self {
        Self {
            qualifier: None,
            type_info: TypeInfo::of::<T>(),
            value,
        }
    }

    /// Qualifier of the service.
    /// `None` for a value populated by [`crate::Container::inject_struct`] directly.
    #[inline]
    #[must_use]
    pub const fn qualifier(&self) -> Option<&'a str> {
        self.qualifier
    }

    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&'a T> {
        self.value.downcast_ref()
    }
}

pub(crate) type HookFn = Arc<dyn Fn(&HookTarget<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Named callback called for every service in a lifecycle phase.
/// Hooks with lower priority are called first.
#[derive(Clone)]
pub struct LifecycleHook {
    pub name: String,
    pub priority: i32,
    handler: HookFn,
}

impl LifecycleHook {
    #[inline]
    #[must_use]
    pub fn new<F>(name: impl Into<String>, priority: i32, handler: F) -> Self
    where
        F: Fn(&HookTarget<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            priority,
            handler: Arc::new(handler),
        }
    }

    #[inline]
    pub fn call(&self, target: &HookTarget<'_>) -> anyhow::Result<()> {
        (self.handler)(target)
    }
}

impl Debug for LifecycleHook {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHook")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Ordered hook lists for both lifecycle phases
#[derive(Clone, Debug, Default)]
pub struct LifecycleManager {
    post_construct_hooks: Vec<LifecycleHook>,
    pre_destroy_hooks: Vec<LifecycleHook>,
}

impl LifecycleManager {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            post_construct_hooks: Vec::new(),
            pre_destroy_hooks: Vec::new(),
        }
    }

    /// Hooks with equal priority keep the order they were added in
    pub fn add_post_construct_hook(&mut self, hook: LifecycleHook) {
        insert_ordered(&mut self.post_construct_hooks, hook);
    }

    pub fn add_pre_destroy_hook(&mut self, hook: LifecycleHook) {
        insert_ordered(&mut self.pre_destroy_hooks, hook);
    }

    #[inline]
    #[must_use]
    pub fn post_construct_hooks(&self) -> &[LifecycleHook] {
        &self.post_construct_hooks
    }

    #[inline]
    #[must_use]
    pub fn pre_destroy_hooks(&self) -> &[LifecycleHook] {
        &self.pre_destroy_hooks
    }

    #[inline]
    #[must_use]
    pub fn hooks(&self, phase: Phase) -> &[LifecycleHook] {
        match phase {
            Phase::PostConstruct => &self.post_construct_hooks,
            Phase::PreDestroy => &self.pre_destroy_hooks,
        }
    }
}

fn insert_ordered(hooks: &mut Vec<LifecycleHook>, hook: LifecycleHook) {
    let position = hooks.partition_point(|existing| existing.priority <= hook.priority);
    hooks.insert(position, hook);
}

/// Calls the hooks in order, then the lifecycle of the service itself.
/// Stops on the first failure.
pub(crate) fn run_phase(
    phase: Phase,
    hooks: &[LifecycleHook],
    target: &HookTarget<'_>,
    lifecycle: Option<&dyn Lifecycle>,
) -> Result<(), LifecycleErrorKind> {
    for hook in hooks {
        if let Err(source) = hook.call(target) {
            return Err(LifecycleErrorKind::HookFailed {
                phase,
                hook: hook.name.clone(),
                type_name: target.type_info.name,
                source,
            });
        }
        debug!(hook = hook.name.as_str(), %phase, "Hook called");
    }

    let Some(lifecycle) = lifecycle else {
        return Ok(());
    };

    let result = match phase {
        Phase::PostConstruct => lifecycle.post_construct(),
        Phase::PreDestroy => lifecycle.pre_destroy(),
    };
    result.map_err(|source| LifecycleErrorKind::CapabilityFailed {
        phase,
        type_name: target.type_info.name,
        source,
    })
}
