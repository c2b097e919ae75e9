//! Identity provider errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider rejected the token, or it was not a usable bearer token.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The provider could not be reached or answered unexpectedly.
    #[error("identity provider unavailable: {0}")]
    Upstream(String),
}

impl IdentityError {
    /// Whether the caller's credentials were rejected, as opposed to the
    /// provider failing.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidToken)
    }
}
