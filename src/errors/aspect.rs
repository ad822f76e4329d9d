use alloc::string::String;

use crate::aspect::AspectKind;

#[derive(thiserror::Error, Debug)]
pub enum AspectErrorKind {
    #[error("{kind} aspect for pointcut `{pointcut}` failed")]
    AdviceFailed {
        kind: AspectKind,
        pointcut: String,
        #[source]
        source: anyhow::Error,
    },
}
