//! Error taxonomy for the session and gateway layers.
//!
//! ERROR HANDLING
//! ==============
//! Identity/role failures never leave this crate as errors: they degrade to a
//! GUEST role inside `role`. Configuration, authentication, and transport
//! failures on gateway calls are surfaced to the caller unchanged and are never
//! retried.

/// A required configuration value is missing or unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required key was absent or empty.
    #[error("missing required configuration: {key}")]
    Missing { key: &'static str },

    /// A key was present but could not be parsed.
    #[error("invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// The auth provider could not supply a session credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No identity is signed in.
    #[error("no signed-in session")]
    SignedOut,

    /// The requested identity is no longer the current session.
    #[error("identity {uid} is no longer signed in")]
    IdentityChanged { uid: String },

    /// The provider failed to mint a fresh token.
    #[error("token fetch failed: {0}")]
    TokenFetch(String),
}

/// A remote call failed at the network, HTTP, or payload level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("unexpected status {status}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

/// Errors returned by [`crate::gateway::CodeServiceGateway`] operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The operation needs a session token and none is available.
    #[error("authentication required: {0}")]
    Authentication(#[from] AuthError),

    /// The backend call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl GatewayError {
    /// Stable machine-readable code for UI display.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "E_UNAUTHENTICATED",
            Self::Transport(TransportError::Timeout) => "E_TIMEOUT",
            Self::Transport(TransportError::Status { .. }) => "E_API_RESPONSE",
            Self::Transport(TransportError::Decode(_)) => "E_API_PARSE",
            Self::Transport(TransportError::Request(_) | TransportError::ClientBuild(_)) => "E_TRANSPORT",
        }
    }

    /// `true` when the failure happened before any request was sent.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
