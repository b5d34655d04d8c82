//! Credential checks
//!
//! A [`CredentialGate`] decides whether a presented API key may fetch an item
//! of a domain. Gates never touch the artifact store and every miss denies.
//!
//! [`StaticGate`] holds a fixed credential map. [`ReloadableGate`] wraps one
//! behind an [`ArcSwap`] so the credential file can be re-read while requests
//! are in flight; readers never take a lock.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{debug, info, warn};

use certvault_common::{ApiKey, ItemKind};
use certvault_config::{load_credentials, CredentialMap, CredentialsError};

/// Authorization policy for item requests
pub trait CredentialGate: Send + Sync {
    /// Whether `key` grants access to `kind` items of `domain`
    fn has_access(&self, domain: &str, kind: ItemKind, key: &ApiKey) -> bool;
}

/// Each credential unlocks exactly one domain, for every item kind
#[derive(Debug, Clone, Default)]
pub struct StaticGate {
    credentials: CredentialMap,
}

impl StaticGate {
    pub fn new(credentials: CredentialMap) -> Self {
        Self { credentials }
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

impl FromIterator<(ApiKey, String)> for StaticGate {
    fn from_iter<I: IntoIterator<Item = (ApiKey, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl CredentialGate for StaticGate {
    fn has_access(&self, domain: &str, kind: ItemKind, key: &ApiKey) -> bool {
        if key.is_empty() {
            debug!(domain = %domain, kind = %kind, "Denied request without credential");
            return false;
        }

        let granted = self
            .credentials
            .get(key)
            .is_some_and(|allowed| allowed == domain);

        if !granted {
            debug!(domain = %domain, kind = %kind, "Credential does not grant domain");
        }
        granted
    }
}

/// [`StaticGate`] backed by a credential file that can be reloaded
pub struct ReloadableGate {
    path: PathBuf,
    current: ArcSwap<StaticGate>,
}

impl ReloadableGate {
    /// Load the credential file at `path`
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CredentialsError> {
        let path = path.into();
        let gate = StaticGate::new(load_credentials(&path)?);
        info!(
            path = %path.display(),
            credentials = gate.len(),
            "Credential gate loaded"
        );

        Ok(Self {
            path,
            current: ArcSwap::from_pointee(gate),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of credentials currently in effect
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// Re-read the credential file
    ///
    /// On failure the credentials in effect stay unchanged.
    pub fn reload(&self) -> Result<usize, CredentialsError> {
        match load_credentials(&self.path) {
            Ok(credentials) => {
                let gate = StaticGate::new(credentials);
                let count = gate.len();
                self.current.store(Arc::new(gate));
                info!(
                    path = %self.path.display(),
                    credentials = count,
                    "Credential gate reloaded"
                );
                Ok(count)
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Credential reload failed, keeping previous credentials"
                );
                Err(e)
            }
        }
    }
}

impl CredentialGate for ReloadableGate {
    fn has_access(&self, domain: &str, kind: ItemKind, key: &ApiKey) -> bool {
        self.current.load().has_access(domain, kind, key)
    }
}
