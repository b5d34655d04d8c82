//! Server, listener, storage and auth KDL parsing.

use anyhow::Result;
use std::path::PathBuf;
use tracing::trace;

use certvault_common::ServerId;

use crate::server::*;

use super::helpers::{get_child, get_string_entry};

/// Parse server configuration block
pub fn parse_server_config(node: &kdl::KdlNode) -> Result<ServerConfig> {
    trace!("Parsing server configuration block");

    let id = match get_string_entry(node, "id") {
        Some(raw) => raw.parse::<ServerId>().map_err(|e| {
            anyhow::anyhow!(
                "Server 'id' must be a UUID, e.g., id \"6ba7b810-9dad-11d1-80b4-00c04fd430c8\": {}",
                e
            )
        })?,
        None => ServerId::default(),
    };

    trace!(server_id = %id, "Parsed server configuration");
    Ok(ServerConfig { id })
}

/// Parse listener configuration block
pub fn parse_listener(node: &kdl::KdlNode) -> Result<ListenerConfig> {
    trace!("Parsing listener configuration block");

    let address = get_string_entry(node, "address").unwrap_or_else(default_address);

    let tls = match get_child(node, "tls") {
        Some(tls_node) => {
            let cert_file = get_string_entry(tls_node, "cert-file").ok_or_else(|| {
                anyhow::anyhow!(
                    "TLS block requires a 'cert-file' field, e.g., cert-file \"/etc/certvault/server.cert\""
                )
            })?;
            let key_file = get_string_entry(tls_node, "key-file").ok_or_else(|| {
                anyhow::anyhow!(
                    "TLS block requires a 'key-file' field, e.g., key-file \"/etc/certvault/server.key\""
                )
            })?;
            Some(TlsConfig {
                cert_file: PathBuf::from(cert_file),
                key_file: PathBuf::from(key_file),
            })
        }
        None => None,
    };

    trace!(
        address = %address,
        tls = tls.is_some(),
        "Parsed listener"
    );

    Ok(ListenerConfig { address, tls })
}

/// Parse storage configuration block
pub fn parse_storage(node: &kdl::KdlNode) -> Result<StorageConfig> {
    let base_dir = get_string_entry(node, "base-dir")
        .map(PathBuf::from)
        .unwrap_or_else(default_base_dir);

    trace!(base_dir = %base_dir.display(), "Parsed storage configuration");
    Ok(StorageConfig { base_dir })
}

/// Parse auth configuration block
pub fn parse_auth(node: &kdl::KdlNode) -> Result<AuthConfig> {
    let file = get_string_entry(node, "file")
        .map(PathBuf::from)
        .unwrap_or_else(default_auth_file);

    trace!(auth_file = %file.display(), "Parsed auth configuration");
    Ok(AuthConfig { file })
}
