//! KDL configuration parsing.

mod helpers;
mod server;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::Config;

pub use helpers::{get_child, get_string_entry};

/// Parse a KDL configuration document
pub fn parse_config(input: &str) -> Result<Config> {
    let doc: kdl::KdlDocument = input.parse().context("Invalid KDL syntax")?;
    let mut config = Config::default();

    for node in doc.nodes() {
        match node.name().value() {
            "server" => config.server = server::parse_server_config(node)?,
            "listener" => config.listener = server::parse_listener(node)?,
            "storage" => config.storage = server::parse_storage(node)?,
            "auth" => config.auth = server::parse_auth(node)?,
            other => warn!(block = %other, "Ignoring unknown configuration block"),
        }
    }

    debug!(
        address = %config.listener.address,
        base_dir = %config.storage.base_dir.display(),
        "Parsed KDL configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            server {
                id "0b5c1d2e-3f40-4a1b-9c2d-3e4f5a6b7c8d"
            }
            listener {
                address "127.0.0.1:8443"
                tls {
                    cert-file "/etc/certvault/server.cert"
                    key-file "/etc/certvault/server.key"
                }
            }
            storage {
                base-dir "/var/lib/certvault"
            }
            auth {
                file "/etc/certvault/auth.json"
            }
            "#,
        )
        .unwrap();

        assert_eq!(
            config.server.id.to_string(),
            "0b5c1d2e-3f40-4a1b-9c2d-3e4f5a6b7c8d"
        );
        assert_eq!(config.listener.address, "127.0.0.1:8443");
        let tls = config.listener.tls.unwrap();
        assert_eq!(tls.cert_file, PathBuf::from("/etc/certvault/server.cert"));
        assert_eq!(tls.key_file, PathBuf::from("/etc/certvault/server.key"));
        assert_eq!(config.storage.base_dir, PathBuf::from("/var/lib/certvault"));
        assert_eq!(config.auth.file, PathBuf::from("/etc/certvault/auth.json"));
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_rejects_bad_server_id() {
        let err = parse_config(r#"server { id "not-a-uuid" }"#).unwrap_err();
        assert!(err.to_string().contains("must be a UUID"));
    }

    #[test]
    fn test_parse_tls_requires_key_file() {
        let err = parse_config(
            r#"
            listener {
                tls {
                    cert-file "server.cert"
                }
            }
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("key-file"));
    }

    #[test]
    fn test_parse_invalid_syntax() {
        assert!(parse_config("listener {").is_err());
    }
}
