use core::fmt::{self, Display, Formatter};

/// Lifetime policy of a registered service.
///
/// Only [`Scope::Singleton`] and [`Scope::Prototype`] are resolvable,
/// [`Scope::Request`] and [`Scope::Session`] can be registered but their resolution fails with
/// [`crate::ResolveErrorKind::UnsupportedScope`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Scope {
    /// One instance, created at registration and shared by every resolution
    #[default]
    Singleton,
    /// Factory is called on every resolution
    Prototype,
    Request,
    Session,
}

impl Scope {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Scope::Singleton => "singleton",
            Scope::Prototype => "prototype",
            Scope::Request => "request",
            Scope::Session => "session",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self, Scope::Singleton)
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
