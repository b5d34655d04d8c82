//! Configuration for the certvault certificate distribution service.
//!
//! Configuration is written in KDL:
//!
//! ```kdl
//! server {
//!     id "6ba7b810-9dad-11d1-80b4-00c04fd430c8"
//! }
//! listener {
//!     address "0.0.0.0:8443"
//!     tls {
//!         cert-file "/etc/certvault/server.cert"
//!         key-file "/etc/certvault/server.key"
//!     }
//! }
//! storage {
//!     base-dir "/var/lib/certvault"
//! }
//! auth {
//!     file "/etc/certvault/auth.json"
//! }
//! ```
//!
//! Every block is optional; omitted values fall back to the defaults in
//! [`server`].

pub mod credentials;
pub mod kdl;
pub mod server;
pub mod validate;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

pub use credentials::{load_credentials, CredentialMap, CredentialsError};
pub use server::{AuthConfig, ListenerConfig, ServerConfig, StorageConfig, TlsConfig};
pub use validate::{ValidationError, ValidationResult, ValidationWarning};

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub listener: ListenerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from a KDL file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = kdl::parse_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Fails if any check reports an error; warnings are logged and returned.
    pub fn validate(&self) -> Result<ValidationResult> {
        let result = validate::validate_config(self);

        for warning in &result.warnings {
            warn!("{}", warning.message);
        }

        if !result.is_ok() {
            let messages: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
            anyhow::bail!(
                "Configuration has {} error(s):\n  {}",
                messages.len(),
                messages.join("\n  ")
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.listener.address, "0.0.0.0:8000");
        assert_eq!(config.storage.base_dir, Path::new("./data"));
        assert_eq!(config.auth.file, Path::new("./data/auth.json"));
        assert!(config.listener.tls.is_none());
        assert_eq!(
            config.server.id.to_string(),
            certvault_common::DEFAULT_SERVER_ID
        );
    }

    #[test]
    fn test_from_file_and_validate() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        fs::create_dir_all(data_dir.join("example.com")).unwrap();
        let auth_path = temp_dir.path().join("auth.json");
        fs::write(&auth_path, r#"{"k": "example.com"}"#).unwrap();

        let config_path = temp_dir.path().join("certvault.kdl");
        fs::write(
            &config_path,
            format!(
                "listener {{\n    address \"127.0.0.1:8000\"\n}}\nstorage {{\n    base-dir {:?}\n}}\nauth {{\n    file {:?}\n}}\n",
                data_dir.display().to_string(),
                auth_path.display().to_string()
            ),
        )
        .unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.storage.base_dir, data_dir);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_errors() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            storage: StorageConfig {
                base_dir: temp_dir.path().join("missing"),
            },
            auth: AuthConfig {
                file: temp_dir.path().join("missing.json"),
            },
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("2 error(s)"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/certvault.kdl").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
