//! # Auth Errors
//!
//! Error types for identity resolution.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Identity resolution errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    // ==================
    // Credential Errors
    // ==================
    /// No credential on the request
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Credential header is not valid text
    #[error("Malformed credential in header {0}")]
    MalformedCredential(String),

    /// Resolver produced a null or empty identity
    #[error("Empty identity")]
    EmptyIdentity,

    // ==================
    // JWT Errors
    // ==================
    /// JWT token is malformed
    #[error("Malformed token")]
    MalformedToken,

    /// JWT token has expired
    #[error("Token expired")]
    TokenExpired,

    /// JWT signature is invalid
    #[error("Invalid token signature")]
    InvalidSignature,

    // ==================
    // Configuration Errors
    // ==================
    /// Header name that HTTP does not allow
    #[error("Invalid identity header name: {0}")]
    InvalidHeaderName(String),

    /// Token generation failed
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(AuthError::AuthenticationRequired.to_string(), "Authentication required");
        assert_eq!(
            AuthError::MalformedCredential("x-user-id".into()).to_string(),
            "Malformed credential in header x-user-id"
        );
    }

    #[test]
    fn test_error_messages_do_not_leak_tokens() {
        let err = AuthError::InvalidSignature;
        assert!(!err.to_string().contains("Bearer"));
    }
}
