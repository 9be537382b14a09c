use std::time::Duration;

use core_config::{ConfigError, FromEnv, env_or_default, env_parse};
use grpc_client::ChannelConfig;
use serde::Deserialize;

/// Where the index server lives and how to talk to it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MuopDbConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Largest encoded message accepted in either direction
    pub max_message_size: usize,
    /// Send requests zstd-compressed; the server must have zstd enabled
    pub compression: bool,
}

impl MuopDbConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_compression(mut self, compression: bool) -> Self {
        self.compression = compression;
        self
    }

    /// gRPC endpoint URI, e.g. `http://localhost:9002`
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig::new()
            .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
    }
}

impl Default for MuopDbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9002,
            connect_timeout_secs: 5,
            request_timeout_secs: 60,
            max_message_size: 64 * 1024 * 1024, // 64MB
            compression: false,
        }
    }
}

impl FromEnv for MuopDbConfig {
    /// Reads MUOPDB_HOST, MUOPDB_PORT, MUOPDB_CONNECT_TIMEOUT_SECS,
    /// MUOPDB_REQUEST_TIMEOUT_SECS, MUOPDB_MAX_MESSAGE_SIZE and MUOPDB_COMPRESSION
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: env_or_default("MUOPDB_HOST", &defaults.host),
            port: env_parse("MUOPDB_PORT", defaults.port)?,
            connect_timeout_secs: env_parse(
                "MUOPDB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            request_timeout_secs: env_parse(
                "MUOPDB_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            max_message_size: env_parse("MUOPDB_MAX_MESSAGE_SIZE", defaults.max_message_size)?,
            compression: env_parse("MUOPDB_COMPRESSION", defaults.compression)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 6] = [
        "MUOPDB_HOST",
        "MUOPDB_PORT",
        "MUOPDB_CONNECT_TIMEOUT_SECS",
        "MUOPDB_REQUEST_TIMEOUT_SECS",
        "MUOPDB_MAX_MESSAGE_SIZE",
        "MUOPDB_COMPRESSION",
    ];

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars_unset(VARS, || {
            let config = MuopDbConfig::from_env().unwrap();
            assert_eq!(config, MuopDbConfig::default());
            assert_eq!(config.endpoint(), "http://localhost:9002");
        });
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("MUOPDB_HOST", Some("10.0.0.3")),
                ("MUOPDB_PORT", Some("19002")),
                ("MUOPDB_REQUEST_TIMEOUT_SECS", Some("5")),
                ("MUOPDB_COMPRESSION", Some("true")),
            ],
            || {
                let config = MuopDbConfig::from_env().unwrap();
                assert_eq!(config.endpoint(), "http://10.0.0.3:19002");
                assert_eq!(config.request_timeout_secs, 5);
                assert!(config.compression);
            },
        );
    }

    #[test]
    fn test_from_env_bad_port() {
        temp_env::with_var("MUOPDB_PORT", Some("99999"), || {
            let err = MuopDbConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("MUOPDB_PORT"));
        });
    }

    #[test]
    fn test_channel_config_uses_timeouts() {
        let config = MuopDbConfig::new("db", 1234).with_request_timeout(7);
        let channel = config.channel_config();
        assert_eq!(channel.timeout, Duration::from_secs(7));
        assert_eq!(channel.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_deserialize_partial_document() {
        let config: MuopDbConfig = serde_json::from_str(r#"{"host": "db", "port": 7000}"#).unwrap();
        assert_eq!(config.endpoint(), "http://db:7000");
        assert_eq!(config.max_message_size, 64 * 1024 * 1024);
    }
}
