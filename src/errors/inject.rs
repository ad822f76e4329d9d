use super::{lifecycle::LifecycleErrorKind, resolve::ResolveErrorKind};
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum InjectErrorKind {
    #[error("Target {type_info} is shared and can't be mutated in place")]
    NotAddressable { type_info: TypeInfo },
    #[error("Target {type_info} has no injection descriptor")]
    NotStruct { type_info: TypeInfo },
    #[error("Required service `{qualifier}` not found for field `{field}` of {target}")]
    RequiredMissing {
        target: &'static str,
        field: &'static str,
        qualifier: &'static str,
        #[source]
        source: ResolveErrorKind,
    },
    #[error("Service type {actual} of `{qualifier}` is not assignable to field `{field}` of type {expected}")]
    TypeMismatch {
        field: &'static str,
        qualifier: &'static str,
        expected: TypeInfo,
        actual: TypeInfo,
    },
    #[error("Post-construct of injected {target} failed")]
    Lifecycle {
        target: &'static str,
        #[source]
        source: LifecycleErrorKind,
    },
}
