//! Configuration for the track ingress daemon
//!
//! Loads configuration from a TOML file. Every section is optional and falls
//! back to the defaults below, so a minimal file only names the source.

use crate::error::{Error, Result};
use crate::protocol::DecodePath;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telemetry source (remote UDP endpoint)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Remote host name or IP of the tracking source
    pub host: String,
    /// Remote UDP port of the tracking source
    pub port: u16,
    /// Local bind address for the inbound socket
    ///
    /// Examples:
    /// - `0.0.0.0:0` - Any interface, ephemeral port
    /// - `0.0.0.0:6104` - Fixed port, for sources that push to a known port
    pub bind_address: String,
    /// Text sent once after connecting so the source starts streaming
    pub greeting: String,
    /// Socket read timeout; bounds how quickly shutdown is noticed
    pub read_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6101,
            bind_address: "0.0.0.0:0".to_string(),
            greeting: "HELLO".to_string(),
            read_timeout_ms: 100,
        }
    }
}

impl SourceConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Datagram decoding options
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// `resolved` (header resolution) or `fixed_offset` (legacy layout)
    pub path: DecodePath,
    /// Retry undecodable datagrams after best-effort decompression
    pub decompress_fallback: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            path: DecodePath::Resolved,
            decompress_fallback: true,
        }
    }
}

/// Delivery of decoded member lists to the presentation layer
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Optional UDP target receiving each member list as length-prefixed JSON
    pub forward_address: Option<String>,
    /// Capacity of the in-process subscriber channel
    pub channel_capacity: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            forward_address: None,
            channel_capacity: 16,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use track_ingress::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("track-ingress.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the daemon cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.source.host.trim().is_empty() {
            return Err(Error::Config("source.host must not be empty".into()));
        }
        if self.source.port == 0 {
            return Err(Error::Config("source.port must be non-zero".into()));
        }
        if self.source.read_timeout_ms == 0 {
            return Err(Error::Config(
                "source.read_timeout_ms must be non-zero".into(),
            ));
        }
        if self.publish.channel_capacity == 0 {
            return Err(Error::Config(
                "publish.channel_capacity must be non-zero".into(),
            ));
        }
        if let Some(addr) = &self.publish.forward_address {
            addr.parse::<SocketAddr>().map_err(|e| {
                Error::Config(format!("publish.forward_address '{}': {}", addr, e))
            })?;
        }
        Ok(())
    }
}
