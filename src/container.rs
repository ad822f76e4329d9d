use alloc::{collections::BTreeMap, string::String, sync::Arc, vec::Vec};
use core::any::type_name;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::{debug, error, info_span, warn, Span};

use crate::{
    any::TypeInfo,
    aspect::{Aspect, AspectManager, JoinPoint},
    config::Config,
    descriptor::{ServiceDescriptor, ServiceInfo},
    errors::{AspectErrorKind, CleanupErrorKind, InjectErrorKind, RegisterErrorKind, ResolveErrorKind},
    factory::{instance, BoxedFactory, Factory},
    inject::Injectable,
    instance::Instance,
    lifecycle::{run_phase, HookTarget, LifecycleHook, LifecycleManager, Phase},
    profile::{Profile, ProfileManager},
    scope::Scope,
};

/// Registry of services identified by qualifiers.
///
/// The container is a cheap handle, clones share the same registry.
/// When the last handle is dropped, the container is cleaned up (see [`Container::cleanup`]).
///
/// # Warning
/// Lifecycle hooks and factories are called while the container is locked for registration,
/// so they can resolve services, but mustn't register services or modify hooks, profiles and aspects of the same container.
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

impl Container {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        ContainerBuilder::new().build()
    }

    #[inline]
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        ContainerBuilder::new().config(config).build()
    }

    #[inline]
    #[must_use]
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Registers the service under the qualifier.
    ///
    /// The service is provided as is for every scope, so a [`Scope::Prototype`] registration
    /// returns the same value on every resolution. Use [`Self::register_factory`] to create a new value per resolution.
    ///
    /// For [`Scope::Singleton`] post-construct hooks and the service lifecycle are called before the service is stored.
    #[allow(clippy::missing_errors_doc)]
    pub fn register(&self, qualifier: impl Into<String>, service: impl Into<Instance>, scope: Scope) -> Result<(), RegisterErrorKind> {
        let service = service.into();
        let dependencies = service.dependencies().iter().map(|dependency| (*dependency).into()).collect();

        self.insert(qualifier.into(), scope, Arc::new(instance(service)), dependencies)
    }

    /// Registers the factory under the qualifier.
    ///
    /// The factory of a [`Scope::Singleton`] is called once right away,
    /// factories of other scopes are called on each resolution.
    #[allow(clippy::missing_errors_doc)]
    pub fn register_factory(&self, qualifier: impl Into<String>, scope: Scope, factory: impl Factory) -> Result<(), RegisterErrorKind> {
        self.insert(qualifier.into(), scope, Arc::new(factory), Vec::new())
    }

    fn insert(&self, qualifier: String, scope: Scope, factory: BoxedFactory, dependencies: Vec<String>) -> Result<(), RegisterErrorKind> {
        let span = info_span!(parent: &self.inner.span, "register", qualifier = qualifier.as_str(), scope = scope.name());
        let _guard = span.enter();

        let state = self.inner.state.upgradable_read();
        if state.index.contains_key(&qualifier) {
            let err = RegisterErrorKind::DuplicateQualifier { qualifier };
            error!("{}", err);
            return Err(err);
        }

        let (instance, dependencies) = if scope.is_cached() {
            let Some(instance) = factory.create() else {
                let err = RegisterErrorKind::NilService { qualifier };
                error!("{}", err);
                return Err(err);
            };

            let target = HookTarget::new(Some(qualifier.as_str()), &instance);
            if let Err(source) = run_phase(Phase::PostConstruct, state.lifecycle.post_construct_hooks(), &target, instance.lifecycle()) {
                let err = RegisterErrorKind::Lifecycle { qualifier, source };
                error!("{}", err);
                return Err(err);
            }
            debug!("Post-construct completed");

            let dependencies = instance.dependencies().iter().map(|dependency| (*dependency).into()).collect();
            (Some(instance), dependencies)
        } else {
            (None, dependencies)
        };

        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        let position = state.services.len();
        state.index.insert(qualifier.clone(), position);
        state.services.push(ServiceDescriptor {
            qualifier,
            scope,
            factory,
            instance,
            dependencies,
            destroyed: false,
        });
        debug!("Registered");

        Ok(())
    }

    /// Resolves the service registered under the qualifier.
    /// If the qualifier isn't registered in the container, it's resolved from the parent chain.
    #[allow(clippy::missing_errors_doc)]
    pub fn resolve_instance(&self, qualifier: &str) -> Result<Instance, ResolveErrorKind> {
        let span = info_span!(parent: &self.inner.span, "resolve", qualifier);
        let _guard = span.enter();

        let lookup = {
            let state = self.inner.state.read_recursive();
            let lookup = match state.get(qualifier) {
                Some(ServiceDescriptor {
                    scope: Scope::Singleton,
                    instance,
                    ..
                }) => Lookup::Cached(instance.clone()),
                Some(ServiceDescriptor {
                    scope: Scope::Prototype,
                    factory,
                    ..
                }) => Lookup::Create {
                    factory: factory.clone(),
                    hooks: state.lifecycle.post_construct_hooks().to_vec(),
                },
                Some(ServiceDescriptor { scope, .. }) => Lookup::Unsupported(*scope),
                None => Lookup::Parent(state.parent.clone()),
            };
            lookup
        };

        match lookup {
            Lookup::Cached(Some(instance)) => {
                debug!("Found in cache");
                Ok(instance)
            }
            Lookup::Create { factory, hooks } => {
                let Some(instance) = factory.create() else {
                    let err = ResolveErrorKind::NilInstance { qualifier: qualifier.into() };
                    error!("{}", err);
                    return Err(err);
                };

                let target = HookTarget::new(Some(qualifier), &instance);
                if let Err(source) = run_phase(Phase::PostConstruct, &hooks, &target, instance.lifecycle()) {
                    let err = ResolveErrorKind::Lifecycle {
                        qualifier: qualifier.into(),
                        source,
                    };
                    error!("{}", err);
                    return Err(err);
                }
                debug!("Created");

                Ok(instance)
            }
            Lookup::Parent(Some(parent)) => {
                debug!("Not found, resolving from parent");
                parent.resolve_instance(qualifier)
            }
            Lookup::Cached(None) => {
                let err = ResolveErrorKind::NilInstance { qualifier: qualifier.into() };
                error!("{}", err);
                Err(err)
            }
            Lookup::Unsupported(scope) => {
                let err = ResolveErrorKind::UnsupportedScope {
                    qualifier: qualifier.into(),
                    scope,
                };
                error!("{}", err);
                Err(err)
            }
            Lookup::Parent(None) => {
                let err = ResolveErrorKind::NotFound { qualifier: qualifier.into() };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Resolves the service registered under the qualifier as `T`
    #[allow(clippy::missing_errors_doc)]
    pub fn resolve<T: Send + Sync + 'static>(&self, qualifier: &str) -> Result<Arc<T>, ResolveErrorKind> {
        let instance = self.resolve_instance(qualifier)?;
        match instance.downcast::<T>() {
            Some(service) => Ok(service),
            None => {
                let err = ResolveErrorKind::IncorrectType {
                    qualifier: qualifier.into(),
                    expected: TypeInfo::of::<T>(),
                    actual: instance.type_info(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Populates injection points of the target.
    ///
    /// Every point is resolved and checked before any field is assigned,
    /// so the target is left untouched on failure.
    /// Unresolved optional points are skipped.
    /// After that, if the target exposes its lifecycle, post-construct hooks and the target lifecycle are called.
    #[allow(clippy::missing_errors_doc)]
    pub fn inject_struct<T: Injectable>(&self, target: &mut T) -> Result<(), InjectErrorKind> {
        let span = info_span!(parent: &self.inner.span, "inject", target = type_name::<T>());
        let _guard = span.enter();

        let points = T::injection_points();
        let mut resolved = Vec::with_capacity(points.len());
        for point in &points {
            let instance = match self.resolve_instance(point.qualifier) {
                Ok(instance) => instance,
                Err(source) if point.required => {
                    let err = InjectErrorKind::RequiredMissing {
                        target: type_name::<T>(),
                        field: point.field,
                        qualifier: point.qualifier,
                        source,
                    };
                    error!("{}", err);
                    return Err(err);
                }
                Err(err) => {
                    warn!(field = point.field, qualifier = point.qualifier, %err, "Optional dependency not resolved, skipped");
                    continue;
                }
            };

            if !point.accepts(&instance) {
                let err = InjectErrorKind::TypeMismatch {
                    field: point.field,
                    qualifier: point.qualifier,
                    expected: point.expected(),
                    actual: instance.type_info(),
                };
                error!("{}", err);
                return Err(err);
            }
            resolved.push((point, instance));
        }

        for (point, instance) in &resolved {
            point.assign(target, instance);
            debug!(field = point.field, "Injected");
        }

        let Some(lifecycle) = target.lifecycle() else {
            return Ok(());
        };

        let hooks = self.inner.state.read_recursive().lifecycle.post_construct_hooks().to_vec();
        let hook_target = HookTarget::from_value(&*target);
        if let Err(source) = run_phase(Phase::PostConstruct, &hooks, &hook_target, Some(lifecycle)) {
            let err = InjectErrorKind::Lifecycle {
                target: type_name::<T>(),
                source,
            };
            error!("{}", err);
            return Err(err);
        }
        debug!("Post-construct completed");

        Ok(())
    }

    /// Populates injection points of a type-erased instance, see [`Self::inject_struct`].
    ///
    /// The instance needs to be created by [`Instance::injectable`] and not shared with other instances,
    /// so inject it before registering.
    #[allow(clippy::missing_errors_doc)]
    pub fn inject_instance(&self, instance: &mut Instance) -> Result<(), InjectErrorKind> {
        let type_info = instance.type_info();
        let injector = instance.injector();

        let Some(value) = Arc::get_mut(&mut instance.value) else {
            let err = InjectErrorKind::NotAddressable { type_info };
            error!("{}", err);
            return Err(err);
        };
        let Some(injector) = injector else {
            let err = InjectErrorKind::NotStruct { type_info };
            error!("{}", err);
            return Err(err);
        };

        injector(self, value)
    }

    /// Sets the container to resolve qualifiers missing in this container from.
    /// Already resolved services aren't affected.
    ///
    /// # Warning
    /// Cycles in the parent chain aren't detected.
    pub fn set_parent(&self, parent: &Container) {
        self.inner.state.write().parent = Some(parent.clone());
        debug!(parent_container = parent.name(), container = self.name(), "Parent set");
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Container> {
        self.inner.state.read_recursive().parent.clone()
    }

    /// Replaces the active profiles
    pub fn set_active_profiles<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.state.write().profiles.set_active(names);
    }

    #[inline]
    #[must_use]
    pub fn is_profile_active(&self, name: &str) -> bool {
        self.inner.state.read_recursive().profiles.is_active(name)
    }

    #[inline]
    #[must_use]
    pub fn active_profiles(&self) -> Vec<String> {
        self.inner.state.read_recursive().profiles.active().to_vec()
    }

    /// Adds or replaces the profile with the same name and returns the replaced one
    pub fn add_profile(&self, profile: Profile) -> Option<Profile> {
        self.inner.state.write().profiles.add_profile(profile)
    }

    pub fn add_aspect(&self, aspect: impl Aspect + 'static) {
        debug!(kind = %aspect.kind(), pointcut = aspect.pointcut(), "Aspect added");
        self.inner.state.write().aspects.add_aspect(aspect);
    }

    /// Runs the advices of registered aspects on the join point, see [`AspectManager::execute`]
    #[allow(clippy::missing_errors_doc)]
    pub fn execute_aspects(&self, join_point: &mut JoinPoint) -> Result<(), AspectErrorKind> {
        let span = info_span!(parent: &self.inner.span, "execute_aspects", method = %join_point.method);
        let _guard = span.enter();

        let aspects = self.inner.state.read_recursive().aspects.clone();
        aspects.execute(join_point).inspect_err(|err| error!("{}", err))
    }

    pub fn add_post_construct_hook(&self, hook: LifecycleHook) {
        debug!(hook = hook.name.as_str(), priority = hook.priority, "Post-construct hook added");
        self.inner.state.write().lifecycle.add_post_construct_hook(hook);
    }

    pub fn add_pre_destroy_hook(&self, hook: LifecycleHook) {
        debug!(hook = hook.name.as_str(), priority = hook.priority, "Pre-destroy hook added");
        self.inner.state.write().lifecycle.add_pre_destroy_hook(hook);
    }

    /// Destroys singletons in reverse registration order,
    /// calling pre-destroy hooks and the lifecycle of every singleton that exposes one.
    /// Singletons without lifecycle and services of other scopes are skipped.
    ///
    /// The first failure stops the cleanup.
    /// Destroyed singletons are never destroyed again, so calling this method again continues from the failed one.
    #[allow(clippy::missing_errors_doc)]
    pub fn cleanup(&self) -> Result<(), CleanupErrorKind> {
        self.inner.cleanup()
    }

    /// Count of services registered in this container, parents aren't counted
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.read_recursive().services.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks the qualifier in this container only
    #[inline]
    #[must_use]
    pub fn contains(&self, qualifier: &str) -> bool {
        self.inner.state.read_recursive().index.contains_key(qualifier)
    }

    /// Snapshots of registered services in registration order
    #[must_use]
    pub fn descriptors(&self) -> Vec<ServiceInfo> {
        self.inner.state.read_recursive().services.iter().map(ServiceDescriptor::info).collect()
    }
}

impl Default for Container {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

enum Lookup {
    Cached(Option<Instance>),
    Create { factory: BoxedFactory, hooks: Vec<LifecycleHook> },
    Unsupported(Scope),
    Parent(Option<Container>),
}

pub struct ContainerBuilder {
    config: Config,
    lifecycle: LifecycleManager,
    profiles: ProfileManager,
    aspects: AspectManager,
    parent: Option<Container>,
}

impl ContainerBuilder {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            lifecycle: LifecycleManager::new(),
            profiles: ProfileManager::new(),
            aspects: AspectManager::new(),
            parent: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[inline]
    #[must_use]
    pub fn lifecycle_manager(mut self, lifecycle: LifecycleManager) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    #[inline]
    #[must_use]
    pub fn profile_manager(mut self, profiles: ProfileManager) -> Self {
        self.profiles = profiles;
        self
    }

    #[inline]
    #[must_use]
    pub fn aspect_manager(mut self, aspects: AspectManager) -> Self {
        self.aspects = aspects;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(mut self, parent: &Container) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    #[must_use]
    pub fn build(self) -> Container {
        let Config { name, span } = self.config;
        let span = match span {
            Some(parent) => info_span!(parent: &parent, "container", container = name),
            None => info_span!("container", container = name),
        };

        Container {
            inner: Arc::new(ContainerInner {
                name,
                span,
                state: RwLock::new(State {
                    services: Vec::new(),
                    index: BTreeMap::new(),
                    lifecycle: self.lifecycle,
                    profiles: self.profiles,
                    aspects: self.aspects,
                    parent: self.parent,
                }),
            }),
        }
    }
}

impl Default for ContainerBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct State {
    services: Vec<ServiceDescriptor>,
    index: BTreeMap<String, usize>,
    lifecycle: LifecycleManager,
    profiles: ProfileManager,
    aspects: AspectManager,
    parent: Option<Container>,
}

impl State {
    #[inline]
    fn get(&self, qualifier: &str) -> Option<&ServiceDescriptor> {
        self.index.get(qualifier).and_then(|&position| self.services.get(position))
    }
}

pub(crate) struct ContainerInner {
    name: &'static str,
    span: Span,
    // Reads use `read_recursive` as hooks resolving services are called under the upgradable lock
    state: RwLock<State>,
}

impl ContainerInner {
    fn cleanup(&self) -> Result<(), CleanupErrorKind> {
        let span = info_span!(parent: &self.span, "cleanup");
        let _guard = span.enter();

        let state = self.state.upgradable_read();
        let mut destroyed = Vec::new();
        let mut result = Ok(());
        for (position, descriptor) in state.services.iter().enumerate().rev() {
            if descriptor.destroyed || !descriptor.scope.is_cached() {
                continue;
            }
            let Some(instance) = &descriptor.instance else {
                continue;
            };
            let Some(lifecycle) = instance.lifecycle() else {
                continue;
            };

            let target = HookTarget::new(Some(descriptor.qualifier.as_str()), instance);
            if let Err(source) = run_phase(Phase::PreDestroy, state.lifecycle.pre_destroy_hooks(), &target, Some(lifecycle)) {
                let err = CleanupErrorKind::PreDestroy {
                    qualifier: descriptor.qualifier.clone(),
                    source,
                };
                error!("{}", err);
                result = Err(err);
                break;
            }
            debug!(qualifier = descriptor.qualifier.as_str(), "Destroyed");
            destroyed.push(position);
        }

        if !destroyed.is_empty() {
            let mut state = RwLockUpgradableReadGuard::upgrade(state);
            for position in destroyed {
                if let Some(descriptor) = state.services.get_mut(position) {
                    descriptor.destroyed = true;
                }
            }
        }

        result
    }
}

impl Drop for ContainerInner {
    fn drop(&mut self) {
        let _ = self.cleanup();
        debug!(container = self.name, "Container closed on drop");
    }
}

#[allow(dead_code)]
#[cfg(test)]
mod tests {
    extern crate std;

    use super::{Container, ContainerInner};
    use crate::{
        any::TypeInfo,
        aspect::{Aspect, AspectKind, AspectManager, JoinPoint, MethodInfo},
        config::Config,
        errors::{CleanupErrorKind, InjectErrorKind, LifecycleErrorKind, RegisterErrorKind, ResolveErrorKind},
        factory::{from_fn, from_fn_managed},
        inject::{Injectable, InjectionPoint},
        instance::Instance,
        lifecycle::{HookTarget, Lifecycle, LifecycleHook, LifecycleManager},
        profile::{Profile, ProfileManager},
        scope::Scope,
    };

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
        vec,
        vec::Vec,
    };
    use anyhow::anyhow;
    use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
    use parking_lot::Mutex;
    use tracing_test::traced_test;

    type Log = Arc<Mutex<Vec<String>>>;

    #[derive(Default)]
    struct Counter(AtomicU8);

    impl Counter {
        fn increment(&self) -> u8 {
            self.0.fetch_add(1, Ordering::SeqCst) + 1
        }
    }

    struct Repository(u8);
    struct Cache;

    #[derive(Default)]
    struct UserService {
        repository: Option<Arc<Repository>>,
        cache: Option<Arc<Cache>>,
        retries: u8,
    }

    impl Injectable for UserService {
        fn injection_points() -> Vec<InjectionPoint<Self>> {
            vec![
                InjectionPoint::<Self>::new::<Option<Arc<Repository>>>("repository", "repository", |service| &mut service.repository).required(true),
                InjectionPoint::<Self>::new::<Option<Arc<Cache>>>("cache", "cache", |service| &mut service.cache),
            ]
        }
    }

    #[derive(Default)]
    struct Endpoint {
        repository: Option<Arc<Repository>>,
        ready: AtomicBool,
    }

    impl Lifecycle for Endpoint {
        fn post_construct(&self) -> anyhow::Result<()> {
            if self.repository.is_none() {
                return Err(anyhow!("repository isn't injected"));
            }
            self.ready.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Injectable for Endpoint {
        fn injection_points() -> Vec<InjectionPoint<Self>> {
            vec![InjectionPoint::<Self>::new::<Option<Arc<Repository>>>("repository", "repository", |endpoint| &mut endpoint.repository).required(true)]
        }

        fn lifecycle(&self) -> Option<&dyn Lifecycle> {
            Some(self)
        }
    }

    struct Tracked {
        name: &'static str,
        log: Log,
        fail_on_destroy: bool,
    }

    impl Lifecycle for Tracked {
        fn post_construct(&self) -> anyhow::Result<()> {
            self.log.lock().push(format!("post:{}", self.name));
            Ok(())
        }

        fn pre_destroy(&self) -> anyhow::Result<()> {
            self.log.lock().push(format!("pre:{}", self.name));
            if self.fail_on_destroy {
                return Err(anyhow!("{} is busy", self.name));
            }
            Ok(())
        }
    }

    fn tracked(name: &'static str, log: &Log) -> Instance {
        Instance::managed(Tracked {
            name,
            log: log.clone(),
            fail_on_destroy: false,
        })
    }

    fn recording_hook(name: &'static str, priority: i32, log: &Log) -> LifecycleHook {
        let log = log.clone();
        LifecycleHook::new(name, priority, move |target: &HookTarget<'_>| {
            log.lock().push(format!("{name}:{}", target.qualifier().unwrap_or(target.type_info().short_name())));
            Ok(())
        })
    }

    #[test]
    #[traced_test]
    fn test_duplicate_qualifier() {
        let container = Container::new();

        container.register("repository", Arc::new(Repository(1)), Scope::Singleton).unwrap();
        let err = container
            .register("repository", Arc::new(Repository(2)), Scope::Singleton)
            .unwrap_err();

        assert!(matches!(err, RegisterErrorKind::DuplicateQualifier { qualifier } if qualifier == "repository"));
        assert_eq!(container.resolve::<Repository>("repository").unwrap().0, 1);
        assert_eq!(container.len(), 1);
    }

    #[test]
    #[traced_test]
    fn test_nil_service() {
        let container = Container::new();

        let err = container.register_factory("missing", Scope::Singleton, || None::<Instance>).unwrap_err();

        assert!(matches!(err, RegisterErrorKind::NilService { .. }));
        assert!(!container.contains("missing"));
        assert!(container.is_empty());
    }

    #[test]
    #[traced_test]
    fn test_singleton_identity() {
        let container = Container::new();
        container.register("counter", Arc::new(Counter::default()), Scope::Singleton).unwrap();

        let first = container.resolve::<Counter>("counter").unwrap();
        let second = container.resolve::<Counter>("counter").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.increment(), 1);
        assert_eq!(second.increment(), 2);
    }

    #[test]
    #[traced_test]
    fn test_prototype_fixed_value() {
        let container = Container::new();
        container.register("counter", Arc::new(Counter::default()), Scope::Prototype).unwrap();

        let first = container.resolve::<Counter>("counter").unwrap();
        let second = container.resolve::<Counter>("counter").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    #[traced_test]
    fn test_prototype_generator() {
        let calls = Arc::new(AtomicU8::new(0));

        let container = Container::new();
        container
            .register_factory("counter", Scope::Prototype, from_fn(Counter::default))
            .unwrap();
        container.add_post_construct_hook(LifecycleHook::new("count", 0, {
            let calls = calls.clone();
            move |_target: &HookTarget<'_>| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }));

        let first = container.resolve::<Counter>("counter").unwrap();
        let second = container.resolve::<Counter>("counter").unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.increment(), 1);
        assert_eq!(second.increment(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[traced_test]
    fn test_resolve_errors() {
        let container = Container::new();
        container.register("repository", Arc::new(Repository(1)), Scope::Singleton).unwrap();
        container.register("request", Arc::new(Cache), Scope::Request).unwrap();
        container.register("session", Arc::new(Cache), Scope::Session).unwrap();
        container.register_factory("empty", Scope::Prototype, || None::<Instance>).unwrap();

        assert!(matches!(
            container.resolve_instance("unknown"),
            Err(ResolveErrorKind::NotFound { qualifier }) if qualifier == "unknown"
        ));
        assert!(matches!(
            container.resolve_instance("request"),
            Err(ResolveErrorKind::UnsupportedScope { scope: Scope::Request, .. })
        ));
        assert!(matches!(
            container.resolve_instance("session"),
            Err(ResolveErrorKind::UnsupportedScope { scope: Scope::Session, .. })
        ));
        assert!(matches!(
            container.resolve_instance("empty"),
            Err(ResolveErrorKind::NilInstance { .. })
        ));

        match container.resolve::<Cache>("repository") {
            Err(ResolveErrorKind::IncorrectType { expected, actual, .. }) => {
                assert_eq!(expected, TypeInfo::of::<Cache>());
                assert_eq!(actual, TypeInfo::of::<Repository>());
            }
            Err(err) => panic!("unexpected error: {err}"),
            Ok(_) => panic!("resolved with incorrect type"),
        }
        assert!(logs_contain("No service found"));
    }

    #[test]
    #[traced_test]
    fn test_hierarchy() {
        let parent = Container::with_config(Config::new("parent"));
        parent.register("repository", Arc::new(Repository(1)), Scope::Singleton).unwrap();
        let child = Container::builder().config(Config::new("child")).parent(&parent).build();

        let from_parent = parent.resolve::<Repository>("repository").unwrap();
        let from_child = child.resolve::<Repository>("repository").unwrap();

        assert!(Arc::ptr_eq(&from_parent, &from_child));
        assert!(!child.contains("repository"));

        child.register("repository", Arc::new(Repository(2)), Scope::Singleton).unwrap();
        assert_eq!(child.resolve::<Repository>("repository").unwrap().0, 2);
        assert_eq!(parent.resolve::<Repository>("repository").unwrap().0, 1);

        let orphan = Container::new();
        assert!(matches!(
            orphan.resolve_instance("repository"),
            Err(ResolveErrorKind::NotFound { .. })
        ));
        let grandchild = Container::builder().parent(&child).build();
        orphan.set_parent(&grandchild);

        assert_eq!(orphan.resolve::<Repository>("repository").unwrap().0, 2);
        assert_eq!(orphan.parent().unwrap().name(), "root");
    }

    #[test]
    #[traced_test]
    fn test_post_construct_on_register() {
        let log = Log::default();

        let container = Container::new();
        container.add_post_construct_hook(recording_hook("metrics", 10, &log));
        container.add_post_construct_hook(recording_hook("audit", -1, &log));

        container.register("db", tracked("db", &log), Scope::Singleton).unwrap();
        assert_eq!(*log.lock(), ["audit:db", "metrics:db", "post:db"]);

        log.lock().clear();
        container.register("plain", Arc::new(Cache), Scope::Singleton).unwrap();
        container.register("lazy", tracked("lazy", &log), Scope::Prototype).unwrap();
        assert_eq!(*log.lock(), ["audit:plain", "metrics:plain"]);
    }

    #[test]
    #[traced_test]
    fn test_post_construct_on_prototype_resolve() {
        let log = Log::default();

        let container = Container::new();
        container
            .register_factory("session", Scope::Prototype, {
                let log = log.clone();
                move || Some(tracked("session", &log))
            })
            .unwrap();
        assert!(log.lock().is_empty());

        container.resolve_instance("session").unwrap();
        container.resolve_instance("session").unwrap();
        assert_eq!(*log.lock(), ["post:session", "post:session"]);

        container
            .register_factory("endpoint", Scope::Prototype, from_fn_managed(Endpoint::default))
            .unwrap();
        let err = container.resolve_instance("endpoint").unwrap_err();
        assert!(matches!(
            err,
            ResolveErrorKind::Lifecycle {
                source: LifecycleErrorKind::CapabilityFailed { .. },
                ..
            }
        ));
        assert!(logs_contain("Resolution of `endpoint` failed"));
    }

    #[test]
    #[traced_test]
    fn test_lifecycle_failures() {
        let container = Container::new();
        container.add_post_construct_hook(LifecycleHook::new("reject", 0, |target: &HookTarget<'_>| {
            match target.qualifier() {
                Some(qualifier) if qualifier.starts_with("rejected") => Err(anyhow!("{qualifier} rejected")),
                _ => Ok(()),
            }
        }));

        let err = container.register("rejected", Arc::new(Cache), Scope::Singleton).unwrap_err();
        assert!(matches!(
            err,
            RegisterErrorKind::Lifecycle {
                source: LifecycleErrorKind::HookFailed { .. },
                ..
            }
        ));
        assert!(!container.contains("rejected"));

        container
            .register_factory("rejected-prototype", Scope::Prototype, from_fn(|| Cache))
            .unwrap();
        assert!(matches!(
            container.resolve_instance("rejected-prototype"),
            Err(ResolveErrorKind::Lifecycle { .. })
        ));
    }

    #[test]
    #[traced_test]
    fn test_required_and_optional_injection() {
        let container = Container::new();
        let mut service = UserService::default();

        let err = container.inject_struct(&mut service).unwrap_err();
        assert!(matches!(
            err,
            InjectErrorKind::RequiredMissing {
                field: "repository",
                source: ResolveErrorKind::NotFound { .. },
                ..
            }
        ));

        container.register("repository", Arc::new(Repository(1)), Scope::Singleton).unwrap();
        container.inject_struct(&mut service).unwrap();

        assert_eq!(service.repository.as_ref().unwrap().0, 1);
        assert!(service.cache.is_none());
        assert_eq!(service.retries, 0);
        assert!(logs_contain("Optional dependency not resolved"));
    }

    #[test]
    #[traced_test]
    fn test_type_mismatch() {
        let container = Container::new();
        container.register("repository", Arc::new(Repository(1)), Scope::Singleton).unwrap();
        container.register("cache", Arc::new(5_u8), Scope::Singleton).unwrap();

        let mut service = UserService::default();
        match container.inject_struct(&mut service).unwrap_err() {
            InjectErrorKind::TypeMismatch {
                field, expected, actual, ..
            } => {
                assert_eq!(field, "cache");
                assert_eq!(expected, TypeInfo::of::<Cache>());
                assert_eq!(actual, TypeInfo::of::<u8>());
            }
            err => panic!("unexpected error: {err}"),
        }
        assert!(service.repository.is_none());
    }

    #[test]
    #[traced_test]
    fn test_inject_target_lifecycle() {
        let log = Log::default();

        let container = Container::new();
        container.add_post_construct_hook(recording_hook("audit", 0, &log));

        let mut endpoint = Endpoint::default();
        let err = container.inject_struct(&mut endpoint).unwrap_err();
        assert!(matches!(err, InjectErrorKind::RequiredMissing { .. }));
        assert!(log.lock().is_empty());

        container.register("repository", Arc::new(Repository(1)), Scope::Singleton).unwrap();
        log.lock().clear();
        container.inject_struct(&mut endpoint).unwrap();

        assert!(endpoint.ready.load(Ordering::SeqCst));
        assert_eq!(*log.lock(), ["audit:Endpoint"]);

        // Targets without lifecycle don't trigger hooks
        log.lock().clear();
        container.inject_struct(&mut UserService::default()).unwrap();
        assert!(log.lock().is_empty());
    }

    #[test]
    #[traced_test]
    fn test_inject_instance() {
        let container = Container::new();
        container.register("repository", Arc::new(Repository(1)), Scope::Singleton).unwrap();

        let mut plain = Instance::new(Repository(2));
        assert!(matches!(
            container.inject_instance(&mut plain),
            Err(InjectErrorKind::NotStruct { .. })
        ));

        let mut endpoint = Instance::injectable(Endpoint::default());
        let shared = endpoint.clone();
        assert!(matches!(
            container.inject_instance(&mut endpoint),
            Err(InjectErrorKind::NotAddressable { .. })
        ));
        drop(shared);

        container.inject_instance(&mut endpoint).unwrap();
        assert!(endpoint.downcast_ref::<Endpoint>().unwrap().ready.load(Ordering::SeqCst));

        container.register("endpoint", endpoint, Scope::Singleton).unwrap();
        let descriptors = container.descriptors();
        assert_eq!(descriptors[1].qualifier, "endpoint");
        assert_eq!(descriptors[1].dependencies, ["repository"]);
    }

    #[test]
    #[traced_test]
    fn test_after_throwing_gating() {
        struct OnError(Arc<AtomicU8>);

        impl Aspect for OnError {
            fn kind(&self) -> AspectKind {
                AspectKind::AfterThrowing
            }

            fn pointcut(&self) -> &str {
                "*.save"
            }

            fn advice(&self, join_point: &mut JoinPoint) -> anyhow::Result<()> {
                assert!(join_point.matches(self.pointcut()));
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let calls = Arc::new(AtomicU8::new(0));
        let container = Container::new();
        container.add_aspect(OnError(calls.clone()));

        let mut join_point = JoinPoint::new(MethodInfo::new("Repository", "save"));
        container.execute_aspects(&mut join_point).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        join_point.error = Some(anyhow!("disk is full"));
        container.execute_aspects(&mut join_point).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[traced_test]
    fn test_concurrent_registration() {
        const COUNT: u8 = 32;

        let container = Container::new();
        std::thread::scope(|threads| {
            for index in 0..COUNT {
                let container = &container;
                threads.spawn(move || {
                    container
                        .register(format!("service-{index}"), Arc::new(index), Scope::Singleton)
                        .unwrap();
                    container.resolve::<u8>(&format!("service-{index}")).unwrap();
                });
            }
        });

        assert_eq!(container.len(), usize::from(COUNT));
    }

    #[test]
    #[traced_test]
    fn test_cleanup_order() {
        let log = Log::default();

        let container = Container::new();
        container.add_pre_destroy_hook(recording_hook("hook", 0, &log));
        container.register("first", tracked("first", &log), Scope::Singleton).unwrap();
        container.register("plain", Arc::new(Cache), Scope::Singleton).unwrap();
        container.register("second", tracked("second", &log), Scope::Singleton).unwrap();
        container.register("prototype", tracked("prototype", &log), Scope::Prototype).unwrap();
        log.lock().clear();

        container.cleanup().unwrap();
        assert_eq!(*log.lock(), ["hook:second", "pre:second", "hook:first", "pre:first"]);
        assert!(container.descriptors().iter().filter(|info| info.destroyed).count() == 2);

        log.lock().clear();
        container.cleanup().unwrap();
        assert!(log.lock().is_empty());
    }

    #[test]
    #[traced_test]
    fn test_cleanup_failure_stops() {
        let log = Log::default();

        let container = Container::new();
        container.register("first", tracked("first", &log), Scope::Singleton).unwrap();
        container
            .register(
                "second",
                Instance::managed(Tracked {
                    name: "second",
                    log: log.clone(),
                    fail_on_destroy: true,
                }),
                Scope::Singleton,
            )
            .unwrap();
        container.register("third", tracked("third", &log), Scope::Singleton).unwrap();
        log.lock().clear();

        let CleanupErrorKind::PreDestroy { qualifier, source } = container.cleanup().unwrap_err();
        assert_eq!(qualifier, "second");
        assert!(matches!(source, LifecycleErrorKind::CapabilityFailed { .. }));
        assert_eq!(*log.lock(), ["pre:third", "pre:second"]);

        log.lock().clear();
        assert!(container.cleanup().is_err());
        assert_eq!(*log.lock(), ["pre:second"]);
    }

    #[test]
    #[traced_test]
    fn test_cleanup_on_drop() {
        let log = Log::default();

        let container = Container::new();
        container.register("db", tracked("db", &log), Scope::Singleton).unwrap();
        let handle = container.clone();

        drop(container);
        assert_eq!(*log.lock(), ["post:db"]);

        drop(handle);
        assert_eq!(*log.lock(), ["post:db", "pre:db"]);
        assert!(logs_contain("Container closed on drop"));
    }

    #[test]
    #[traced_test]
    fn test_profiles() {
        let container = Container::new();

        assert!(container.add_profile(Profile::new("dev")).is_none());
        container.set_active_profiles(["dev", "test"]);

        assert!(container.is_profile_active("dev"));
        assert!(!container.is_profile_active("prod"));
        assert_eq!(container.active_profiles(), ["dev", "test"]);

        container.set_active_profiles(["prod"]);
        assert!(!container.is_profile_active("dev"));
        assert_eq!(container.add_profile(Profile::new("dev")).map(|profile| profile.active), Some(false));
    }

    #[test]
    #[traced_test]
    fn test_builder_with_managers() {
        struct Noop;

        impl Aspect for Noop {
            fn kind(&self) -> AspectKind {
                AspectKind::Before
            }

            fn pointcut(&self) -> &str {
                "*"
            }

            fn advice(&self, _join_point: &mut JoinPoint) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let log = Log::default();

        let mut lifecycle = LifecycleManager::new();
        lifecycle.add_post_construct_hook(recording_hook("audit", 0, &log));
        let mut profiles = ProfileManager::new();
        profiles.set_active(["dev"]);
        let mut aspects = AspectManager::new();
        aspects.add_aspect(Noop);

        let container = Container::builder()
            .config(Config::new("app").with_span(tracing::info_span!("app")))
            .lifecycle_manager(lifecycle)
            .profile_manager(profiles)
            .aspect_manager(aspects)
            .build();

        container.register("cache", Arc::new(Cache), Scope::Singleton).unwrap();

        assert_eq!(container.name(), "app");
        assert_eq!(*log.lock(), ["audit:cache"]);
        assert!(container.is_profile_active("dev"));
        container
            .execute_aspects(&mut JoinPoint::new(MethodInfo::of::<Cache>("get")))
            .unwrap();
    }

    #[test]
    #[traced_test]
    fn test_descriptors() {
        let container = Container::new();
        container.register("second", Arc::new(Cache), Scope::Singleton).unwrap();
        container
            .register_factory("first", Scope::Prototype, from_fn(Counter::default))
            .unwrap();

        let descriptors = container.descriptors();

        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].qualifier, "second");
        assert_eq!(descriptors[0].type_info, Some(TypeInfo::of::<Cache>()));
        assert_eq!(descriptors[1].scope, Scope::Prototype);
        assert!(descriptors[1].type_info.is_none());
        assert!(!descriptors[1].destroyed);
    }

    #[test]
    fn test_thread_safe() {
        fn impl_bounds<T: Send + Sync + 'static>() {}

        impl_bounds::<(Container, ContainerInner)>();
    }
}
