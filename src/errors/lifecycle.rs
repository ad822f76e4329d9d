use alloc::string::String;

use crate::lifecycle::Phase;

#[derive(thiserror::Error, Debug)]
pub enum LifecycleErrorKind {
    #[error("{phase} hook `{hook}` failed for {type_name}")]
    HookFailed {
        phase: Phase,
        hook: String,
        type_name: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("{phase} of {type_name} failed")]
    CapabilityFailed {
        phase: Phase,
        type_name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl LifecycleErrorKind {
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::HookFailed { phase, .. } | Self::CapabilityFailed { phase, .. } => *phase,
        }
    }
}
