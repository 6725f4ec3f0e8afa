//! Error taxonomy for tripchat.
//!
//! Every failure in this crate is fatal to the run it occurs in: credential
//! and configuration errors surface before any turn executes, transport and
//! provider errors halt the conversation loop on the turn that raised them.
//! Nothing is retried.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChatError>;

/// Failures surfaced by clients, providers, and the conversation loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// The API key is missing or could not be obtained interactively.
    #[error("credential error: {0}")]
    Credential(String),

    /// Startup-time misconfiguration, e.g. an unknown provider name or an
    /// empty participant list.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A network-level failure: connect, TLS, timeout, or a broken stream.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend rejected the request, or the request asked for a
    /// capability the model was not configured with.
    #[error("provider error: {0}")]
    Provider(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChatError::Credential("OPENROUTER_API_KEY not set".to_string());
        assert_eq!(
            err.to_string(),
            "credential error: OPENROUTER_API_KEY not set"
        );

        let err = ChatError::Configuration("unknown provider: azure".to_string());
        assert!(err.to_string().starts_with("configuration error"));

        let err = ChatError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "transport error: connection refused");
    }
}
