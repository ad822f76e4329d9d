mod aspect;
mod container;
mod inject;
mod lifecycle;
mod resolve;

pub use aspect::AspectErrorKind;
pub use container::{CleanupErrorKind, RegisterErrorKind};
pub use inject::InjectErrorKind;
pub use lifecycle::LifecycleErrorKind;
pub use resolve::ResolveErrorKind;
