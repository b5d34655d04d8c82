//! Server, listener, storage and credential configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use certvault_common::ServerId;

/// Instance-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Identifier reported by the ping endpoint
    #[serde(default)]
    pub id: ServerId,
}

/// Listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Socket address to bind (e.g., "0.0.0.0:8000")
    #[serde(default = "default_address")]
    pub address: String,

    /// TLS termination; plain HTTP when absent
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            tls: None,
        }
    }
}

/// TLS certificate and key used to serve HTTPS
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

/// Artifact storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding one subdirectory per domain
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

/// Credential mapping settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JSON file mapping API keys to the domain they unlock
    #[serde(default = "default_auth_file")]
    pub file: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            file: default_auth_file(),
        }
    }
}

pub fn default_address() -> String {
    "0.0.0.0:8000".to_string()
}

pub fn default_base_dir() -> PathBuf {
    PathBuf::from("./data")
}

pub fn default_auth_file() -> PathBuf {
    PathBuf::from("./data/auth.json")
}
