//! Error types for the Userbase application

use thiserror::Error;

/// Authentication error types
///
/// The token variants are distinguished for logging only; HTTP callers see a
/// single "unauthenticated" outcome for all of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing token")]
    MissingToken,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token subject does not exist")]
    UnknownSubject,
}

impl AuthError {
    /// Whether this error came from the bearer token rather than a login attempt
    pub fn is_token_error(&self) -> bool {
        !matches!(self, AuthError::InvalidCredentials)
    }
}
