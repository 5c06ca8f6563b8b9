//! Configuration for the device client
//!
//! This module defines the connection settings for one intercom device,
//! including credentials, transport security, and timing knobs.

use std::time::Duration;

use crate::error::ClientError;

/// Transport security for device connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportSecurity {
    /// Plain HTTP
    #[default]
    Plain,
    /// HTTPS without certificate verification
    ///
    /// Intercom devices ship self-signed certificates, so hostname and chain
    /// verification are disabled in this mode.
    TlsInsecure,
}

/// Strategy for the first request before any digest challenge has been seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstContact {
    /// Send Basic credentials optimistically and fall back to Digest on 401
    #[default]
    Basic,
    /// Send no Authorization header and let the 401 challenge drive Digest
    Digest,
}

/// Configuration for a [`DeviceClient`](crate::DeviceClient)
///
/// Credentials are immutable after construction. Use the `with_*` builder
/// methods to adjust the defaults before creating the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Device hostname or IP address
    pub host: String,

    /// Device HTTP port
    /// Default: 80
    pub port: u16,

    /// API username
    pub username: String,

    /// API password
    pub password: String,

    /// Transport security mode
    /// Default: plain HTTP
    pub security: TransportSecurity,

    /// First-contact authentication strategy
    /// Default: optimistic Basic
    pub first_contact: FirstContact,

    /// Upper bound for a single request
    /// Default: 10 seconds
    pub request_timeout: Duration,

    /// Backoff between failed first-contact probes
    /// Default: 30 seconds
    pub init_retry_backoff: Duration,
}

impl ClientConfig {
    /// Create a configuration with default timing for the given device
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: 80,
            username: username.into(),
            password: password.into(),
            security: TransportSecurity::default(),
            first_contact: FirstContact::default(),
            request_timeout: Duration::from_secs(10),
            init_retry_backoff: Duration::from_secs(30),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_security(mut self, security: TransportSecurity) -> Self {
        self.security = security;
        self
    }

    pub fn with_first_contact(mut self, first_contact: FirstContact) -> Self {
        self.first_contact = first_contact;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_init_retry_backoff(mut self, backoff: Duration) -> Self {
        self.init_retry_backoff = backoff;
        self
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.host.is_empty() {
            return Err(ClientError::Configuration(
                "Device host must not be empty".to_string(),
            ));
        }

        if self.username.is_empty() {
            return Err(ClientError::Configuration(
                "Username must not be empty".to_string(),
            ));
        }

        if self.request_timeout == Duration::ZERO {
            return Err(ClientError::Configuration(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// URL scheme implied by the transport security mode
    pub fn scheme(&self) -> &'static str {
        match self.security {
            TransportSecurity::Plain => "http",
            TransportSecurity::TlsInsecure => "https",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::new("192.168.1.50", "admin", "secret");
        assert_eq!(config.port, 80);
        assert_eq!(config.security, TransportSecurity::Plain);
        assert_eq!(config.first_contact, FirstContact::Basic);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.init_retry_backoff, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = ClientConfig::new("", "admin", "secret");
        assert!(config.validate().is_err());

        let config = ClientConfig::new("192.168.1.50", "", "secret");
        assert!(config.validate().is_err());

        let config = ClientConfig::new("192.168.1.50", "admin", "secret")
            .with_request_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::new("door.local", "admin", "secret")
            .with_port(8443)
            .with_security(TransportSecurity::TlsInsecure)
            .with_first_contact(FirstContact::Digest)
            .with_request_timeout(Duration::from_secs(5));

        assert_eq!(config.port, 8443);
        assert_eq!(config.scheme(), "https");
        assert_eq!(config.first_contact, FirstContact::Digest);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }
}
