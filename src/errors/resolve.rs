use alloc::string::String;

use super::lifecycle::LifecycleErrorKind;
use crate::{any::TypeInfo, scope::Scope};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No service found for qualifier `{qualifier}`")]
    NotFound { qualifier: String },
    #[error("Service instance is absent for qualifier `{qualifier}`")]
    NilInstance { qualifier: String },
    #[error("Unsupported scope `{scope}` of qualifier `{qualifier}`")]
    UnsupportedScope { qualifier: String, scope: Scope },
    #[error("Incorrect service type for qualifier `{qualifier}`. Actual: {actual}, expected: {expected}")]
    IncorrectType {
        qualifier: String,
        expected: TypeInfo,
        actual: TypeInfo,
    },
    #[error("Resolution of `{qualifier}` failed")]
    Lifecycle {
        qualifier: String,
        #[source]
        source: LifecycleErrorKind,
    },
}
