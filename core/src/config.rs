//! Client configuration: where the internal gateway lives and how requests
//! identify themselves to it.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::url::{parse_url, ParsedUrl};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const SOURCE_HEADER: &str = "Kuscia-Source";
pub const HOST_HEADER: &str = "Kuscia-Host";

pub const DEFAULT_INTERNAL_SERVER: &str = "http://127.0.0.1:80";
pub const DEFAULT_HANDSHAKE_HEADER: &str = "Kuscia-Handshake";

const ENV_INTERNAL_SERVER: &str = "GATEWAY_INTERNAL_SERVER";
const ENV_HANDSHAKE_HEADER: &str = "GATEWAY_HANDSHAKE_HEADER";
const ENV_TIMEOUT_MS: &str = "GATEWAY_TIMEOUT_MS";

/// Configuration for `GatewayClient`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin every request path is appended to.
    pub internal_server: String,
    /// Prefix of the cluster identity header (`<prefix>-Cluster`).
    pub handshake_header: String,
    /// Per-request timeout enforced by the transport. `None` waits forever.
    pub timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            internal_server: DEFAULT_INTERNAL_SERVER.to_string(),
            handshake_header: DEFAULT_HANDSHAKE_HEADER.to_string(),
            timeout_ms: None,
        }
    }
}

impl ClientConfig {
    pub fn new(internal_server: &str) -> Self {
        Self {
            internal_server: internal_server.to_string(),
            ..Self::default()
        }
    }

    /// Build a config from `GATEWAY_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(server) = lookup(ENV_INTERNAL_SERVER) {
            config.internal_server = server;
        }
        if let Some(header) = lookup(ENV_HANDSHAKE_HEADER) {
            config.handshake_header = header;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|source| ConfigError::Timeout {
                var: ENV_TIMEOUT_MS,
                source,
            })?;
            config.timeout_ms = Some(ms);
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that the internal server is an `http(s)://host[:port]` origin.
    pub fn validate(&self) -> Result<ParsedUrl, ConfigError> {
        Ok(parse_url(&self.internal_server)?)
    }

    /// Internal server without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.internal_server.trim_end_matches('/')
    }

    pub fn cluster_header(&self) -> String {
        format!("{}-Cluster", self.handshake_header)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
