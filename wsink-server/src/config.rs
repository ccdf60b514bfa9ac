//! Server configuration
//!
//! Fixed listen address plus the operational limits of the decoder and the
//! bind-retry loop. There is no CLI surface and no configuration file; the
//! defaults match the reference deployment (localhost:8080, 1 s retry
//! backoff on a busy address).

use std::time::Duration;
use wsink_core::error::{ConfigError, Error};
use wsink_core::protocol::constants::DEFAULT_MAX_FRAME_SIZE;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub bind_address: std::net::SocketAddr,
    /// Maximum concurrent connections
    pub max_connections: usize,
    /// Maximum frame payload size in bytes
    pub max_frame_size: usize,
    /// Handshake timeout
    pub handshake_timeout: Duration,
    /// Bind attempts before giving up when the address is in use
    pub bind_retry_attempts: u32,
    /// Delay between bind attempts
    pub bind_retry_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".parse().unwrap(),
            max_connections: 10_000,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            handshake_timeout: Duration::from_secs(10),
            bind_retry_attempts: 5,
            bind_retry_delay: Duration::from_secs(1),
        }
    }
}

impl ServerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> wsink_core::Result<()> {
        if self.max_connections == 0 {
            return Err(Error::Config(ConfigError::Validation(
                "max_connections must be greater than 0".to_string(),
            )));
        }

        if self.max_frame_size == 0 {
            return Err(Error::Config(ConfigError::Validation(
                "max_frame_size must be greater than 0".to_string(),
            )));
        }

        if self.bind_retry_attempts == 0 {
            return Err(Error::Config(ConfigError::Validation(
                "bind_retry_attempts must be greater than 0".to_string(),
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address.port(), 8080);
        assert!(config.bind_address.ip().is_loopback());
        assert_eq!(config.bind_retry_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_server_config_validation() {
        let mut config = ServerConfig::default();
        config.max_connections = 0;
        assert!(config.validate().is_err());

        config.max_connections = 100;
        config.max_frame_size = 0;
        assert!(config.validate().is_err());

        config.max_frame_size = 1024;
        config.bind_retry_attempts = 0;
        assert!(config.validate().is_err());
    }
}
