//! Errors raised while bringing a Vertex AI entry online.

use thiserror::Error;

/// Setup failures, split by how the host should react.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Credentials could not be loaded or the token endpoint was unreachable;
    /// the entry is not ready and may be retried later
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Failed to load service account credentials
    #[error("Failed to load credentials from {path}: {message}")]
    CredentialsFile { path: String, message: String },

    /// The remote service rejected the credential itself; retrying cannot help
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SetupError {
    /// Whether the entry should be disabled rather than retried.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidCredential(_))
    }
}

/// Markers the OAuth and Vertex endpoints use when a key is rejected outright.
const INVALID_CREDENTIAL_MARKERS: [&str; 4] = [
    "API_KEY_INVALID",
    "invalid_grant",
    "invalid_client",
    "unauthorized_client",
];

/// Classify a token-fetch failure message.
pub(crate) fn classify_token_error(message: String) -> SetupError {
    if INVALID_CREDENTIAL_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
    {
        SetupError::InvalidCredential(message)
    } else {
        SetupError::Authentication(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_key_is_fatal() {
        let err = classify_token_error(
            r#"token request failed: {"error":"invalid_grant","error_description":"Invalid JWT Signature."}"#
                .to_string(),
        );
        assert!(matches!(err, SetupError::InvalidCredential(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_network_trouble_is_retryable() {
        let err = classify_token_error("error sending request: connection refused".to_string());
        assert!(matches!(err, SetupError::Authentication(_)));
        assert!(!err.is_fatal());
    }
}
