use alloc::string::String;

use super::lifecycle::LifecycleErrorKind;

#[derive(thiserror::Error, Debug)]
pub enum RegisterErrorKind {
    #[error("Cannot register absent service for qualifier `{qualifier}`")]
    NilService { qualifier: String },
    #[error("Service already registered for qualifier `{qualifier}`")]
    DuplicateQualifier { qualifier: String },
    #[error("Registration of `{qualifier}` failed")]
    Lifecycle {
        qualifier: String,
        #[source]
        source: LifecycleErrorKind,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum CleanupErrorKind {
    #[error("Cleanup of `{qualifier}` failed")]
    PreDestroy {
        qualifier: String,
        #[source]
        source: LifecycleErrorKind,
    },
}
