//! Error types for the device client

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the intercom device
#[derive(Debug, Error)]
pub enum ClientError {
    /// The device rejected the digest retry after a fresh challenge
    ///
    /// Two consecutive 401 responses mean the credentials are wrong; the
    /// client never attempts a third request.
    #[error("authentication failed for user '{username}'")]
    Authentication {
        /// Username the device rejected
        username: String,
    },

    /// Non-success HTTP status outside the authentication dance
    ///
    /// Carries a truncated body excerpt, not the full body, so error output
    /// stays bounded.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code returned by the device
        status: u16,
        /// Truncated response body excerpt
        body: String,
    },

    /// The response body was not the expected JSON envelope
    #[error("malformed device response: {0}")]
    Parse(String),

    /// Well-formed envelope with `success: false`
    #[error("device error {code}: {message}")]
    Device {
        /// Device-defined error code
        code: i64,
        /// Device-supplied error message
        message: String,
    },

    /// The request exceeded its time budget
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport-level failure (connect, DNS, TLS)
    #[error("network error: {0}")]
    Network(String),

    /// Invalid client configuration
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Convenience type alias for Results using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ClientError::Authentication {
            username: "admin".to_string(),
        };
        assert_eq!(error.to_string(), "authentication failed for user 'admin'");

        let error = ClientError::Http {
            status: 503,
            body: "Service Unavailable".to_string(),
        };
        assert_eq!(error.to_string(), "HTTP 503: Service Unavailable");

        let error = ClientError::Device {
            code: 5,
            message: "busy".to_string(),
        };
        assert_eq!(error.to_string(), "device error 5: busy");

        let error = ClientError::Parse("not JSON".to_string());
        assert_eq!(error.to_string(), "malformed device response: not JSON");
    }
}
