use std::error::Error as StdError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by cluster lookups.
///
/// Client failures are passed through as-is: nothing in this crate retries or rewrites them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested resource does not exist.
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: &'static str,
        namespace: String,
        name: String,
    },

    /// The cluster client failed to complete a request.
    #[error("cluster request failed: {0}")]
    Remote(#[source] Box<dyn StdError + Send + Sync + 'static>),

    /// A lookup task terminated without reporting a result.
    #[error("{0} lookup terminated before completing")]
    Lost(&'static str),
}

// === impl Error ===

impl Error {
    pub fn not_found(
        kind: &'static str,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn remote(error: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self::Remote(error.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
