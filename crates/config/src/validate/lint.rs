//! Configuration linting for deployment practices
//!
//! Flags settings that work but expose key material more than necessary.

use super::{ValidationResult, ValidationWarning};
use crate::Config;

/// Lint configuration for deployment practices
pub fn lint_config(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::new();

    // Keys travel in bearer headers; without TLS they are readable on the wire
    if config.listener.tls.is_none() && !is_loopback(&config.listener.address) {
        result.add_warning(ValidationWarning::new(format!(
            "Listener '{}' serves private keys over plain HTTP (configure a tls block)",
            config.listener.address
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if let Ok(metadata) = std::fs::metadata(&config.auth.file) {
            if metadata.permissions().mode() & 0o004 != 0 {
                result.add_warning(ValidationWarning::new(format!(
                    "Credential file {:?} is world-readable",
                    config.auth.file
                )));
            }
        }
    }

    result
}

fn is_loopback(address: &str) -> bool {
    address
        .parse::<std::net::SocketAddr>()
        .map(|addr| addr.ip().is_loopback())
        .unwrap_or_else(|_| address.starts_with("localhost:"))
}
