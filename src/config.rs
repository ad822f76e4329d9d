use tracing::Span;

/// Config for a container
/// ## Fields
/// - `name`:
///   Name of the container, recorded in every span the container opens.
///   Useful to tell apart parent and child containers in logs.
///
/// - `span`:
///   Parent span of the container span.
///   If `None`, the span current at the moment of building is used.
#[derive(Clone, Debug)]
pub struct Config {
    pub name: &'static str,
    pub span: Option<Span>,
}

impl Config {
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name, span: None }
    }

    #[inline]
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("root")
    }
}
