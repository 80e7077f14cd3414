//! Per-request language context.

/// Ephemeral language state for a single request or operation.
///
/// Built at the start of request handling and discarded at its end. Holds
/// the resolved current language, the caller's preferred language (an
/// editor-level setting, distinct from the request's language), and a
/// language explicitly requested through a transport-level parameter.
/// Never persisted, never shared across concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Language bound to the present request, once resolved
    pub current: Option<String>,

    /// Caller-level preferred language (e.g., editor setting)
    pub preferred: Option<String>,

    /// Language explicitly requested via a transport-level parameter
    pub requested: Option<String>,
}

impl RequestContext {
    /// An empty context: nothing resolved, nothing requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current request language.
    pub fn with_current(mut self, slug: impl Into<String>) -> Self {
        self.current = Some(slug.into());
        self
    }

    /// Set the caller's preferred language.
    pub fn with_preferred(mut self, slug: impl Into<String>) -> Self {
        self.preferred = Some(slug.into());
        self
    }

    /// Set the explicitly requested language parameter.
    pub fn with_requested(mut self, slug: impl Into<String>) -> Self {
        self.requested = Some(slug.into());
        self
    }
}
