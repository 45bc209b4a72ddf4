//! Error types for remote synchronization.

use thiserror::Error;

/// Why a sync operation failed.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The server rejected the credentials or token (400/401/403).
    /// Carries the server's message for display to the user.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport failure: connection refused, timeout, unexpected status.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A push or pull was requested without a signed-in session.
    ///
    /// This is a soft outcome, not a crash: no network call is made and the
    /// caller's local mutation is unaffected.
    #[error("not authenticated")]
    NotAuthenticated,
}

impl SyncError {
    /// Whether the failure means the stored token is no longer usable.
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Auth(_))
    }
}
