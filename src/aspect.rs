use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::{
    any::Any,
    fmt::{self, Debug, Display, Formatter},
};
use tracing::debug;

use crate::{any::TypeInfo, errors::AspectErrorKind, instance::Instance, pointcut};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AspectKind {
    Before,
    After,
    Around,
    AfterReturning,
    AfterThrowing,
}

impl AspectKind {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            AspectKind::Before => "before",
            AspectKind::After => "after",
            AspectKind::Around => "around",
            AspectKind::AfterReturning => "after returning",
            AspectKind::AfterThrowing => "after throwing",
        }
    }
}

impl Display for AspectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cross-cutting behavior applied at a join point.
///
/// The pointcut is a descriptive pattern, dispatch doesn't filter aspects by it.
/// Use [`JoinPoint::matches`] inside the advice to restrict it to some methods.
pub trait Aspect: Send + Sync {
    fn kind(&self) -> AspectKind;

    fn pointcut(&self) -> &str;

    fn advice(&self, join_point: &mut JoinPoint) -> anyhow::Result<()>;
}

/// Identity of an intercepted method
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MethodInfo {
    pub type_name: &'static str,
    pub name: &'static str,
}

impl MethodInfo {
    #[inline]
    #[must_use]
    pub const fn new(type_name: &'static str, name: &'static str) -> Self {
        Self { type_name, name }
    }

    /// Method of `T`, named by the type's short name
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self::new(TypeInfo::of::<T>().short_name(), name)
    }
}

impl Display for MethodInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.name)
    }
}

pub type Value = Box<dyn Any + Send + Sync>;

/// Context of an intercepted call, shared by all advices of one dispatch
pub struct JoinPoint {
    pub target: Option<Instance>,
    pub method: MethodInfo,
    pub args: Vec<Value>,
    pub return_vals: Vec<Value>,
    pub error: Option<anyhow::Error>,
}

impl JoinPoint {
    #[inline]
    #[must_use]
    pub const fn new(method: MethodInfo) -> Self {
        Self {
            target: None,
            method,
            args: Vec::new(),
            return_vals: Vec::new(),
            error: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_target(mut self, target: impl Into<Instance>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_arg<T: Send + Sync + 'static>(mut self, arg: T) -> Self {
        self.args.push(Box::new(arg));
        self
    }

    #[inline]
    #[must_use]
    pub fn with_error(mut self, error: anyhow::Error) -> Self {
        self.error = Some(error);
        self
    }

    #[inline]
    pub fn push_return<T: Send + Sync + 'static>(&mut self, val: T) {
        self.return_vals.push(Box::new(val));
    }

    #[inline]
    #[must_use]
    pub fn arg<T: 'static>(&self, index: usize) -> Option<&T> {
        self.args.get(index)?.downcast_ref()
    }

    #[inline]
    #[must_use]
    pub fn return_val<T: 'static>(&self, index: usize) -> Option<&T> {
        self.return_vals.get(index)?.downcast_ref()
    }

    /// Checks the method against a pointcut pattern, see [`pointcut::matches`]
    #[inline]
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        pointcut::matches(pattern, &self.method)
    }
}

impl Debug for JoinPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinPoint")
            .field("target", &self.target)
            .field("method", &self.method)
            .field("args", &self.args.len())
            .field("return_vals", &self.return_vals.len())
            .field("error", &self.error)
            .finish()
    }
}

/// Registered aspects in the order they were added
#[derive(Clone, Default)]
pub struct AspectManager {
    aspects: Vec<Arc<dyn Aspect>>,
}

impl AspectManager {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { aspects: Vec::new() }
    }

    #[inline]
    pub fn add_aspect(&mut self, aspect: impl Aspect + 'static) {
        self.aspects.push(Arc::new(aspect));
    }

    #[inline]
    #[must_use]
    pub fn aspects(&self) -> &[Arc<dyn Aspect>] {
        &self.aspects
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.aspects.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty()
    }

    /// Runs the advices in registration order.
    /// `after throwing` advices are skipped unless the join point has an error.
    /// The first failed advice stops the dispatch.
    pub fn execute(&self, join_point: &mut JoinPoint) -> Result<(), AspectErrorKind> {
        for aspect in &self.aspects {
            let kind = aspect.kind();
            if kind == AspectKind::AfterThrowing && join_point.error.is_none() {
                debug!(pointcut = aspect.pointcut(), "No error, after throwing advice skipped");
                continue;
            }

            if let Err(source) = aspect.advice(join_point) {
                return Err(AspectErrorKind::AdviceFailed {
                    kind,
                    pointcut: aspect.pointcut().into(),
                    source,
                });
            }
            debug!(%kind, pointcut = aspect.pointcut(), "Advice called");
        }
        Ok(())
    }
}

impl Debug for AspectManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.aspects.iter().map(|aspect| (aspect.kind(), aspect.pointcut())))
            .finish()
    }
}
