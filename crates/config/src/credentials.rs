//! Credential file loading.
//!
//! The credential file is a JSON object mapping each API key to the single
//! domain it unlocks:
//!
//! ```json
//! {
//!     "3f1c9a0e7b2d4e6f": "example.com",
//!     "9d8c7b6a5f4e3d2c": "mail.example.com"
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use certvault_common::ApiKey;

/// Errors raised while loading a credential file
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("failed to read credential file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse credential file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Credential to domain mapping
pub type CredentialMap = HashMap<ApiKey, String>;

/// Load the credential file at `path`
pub fn load_credentials(path: &Path) -> Result<CredentialMap, CredentialsError> {
    let content = fs::read_to_string(path).map_err(|source| CredentialsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let map = parse_credentials(&content).map_err(|source| CredentialsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        path = %path.display(),
        credentials = map.len(),
        "Loaded credential file"
    );
    Ok(map)
}

/// Parse credential JSON, dropping entries with an empty key or domain
pub fn parse_credentials(content: &str) -> Result<CredentialMap, serde_json::Error> {
    let raw: HashMap<String, String> = serde_json::from_str(content)?;

    let mut map = CredentialMap::with_capacity(raw.len());
    for (key, domain) in raw {
        if key.is_empty() || domain.is_empty() {
            warn!(domain = %domain, "Skipping credential entry with empty key or domain");
            continue;
        }
        map.insert(ApiKey::new(key), domain);
    }
    Ok(map)
}
