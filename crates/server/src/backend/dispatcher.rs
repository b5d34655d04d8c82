//! Request dispatch
//!
//! [`CertBackend`] is the entry point of the distribution backend. Every
//! operation runs the same linear pipeline:
//!
//! 1. authorize the credential for the domain and item kind
//! 2. scope the store to the domain (rejecting malformed domains)
//! 3. resolve the item kind to artifact names
//! 4. stat and read the artifacts
//! 5. parse, encode, or pass the bytes through
//!
//! No state is kept between requests.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use certvault_common::{ApiKey, ItemKind, ItemStat, RenewalInfo, ResultItem};

use super::archive;
use super::auth::CredentialGate;
use super::error::BackendError;
use super::metadata;
use super::resolver::{self, Artifacts};
use super::store::{ArtifactStat, ArtifactStore, DomainStore};

/// Authorized, domain-scoped access to certificate material
#[derive(Clone)]
pub struct CertBackend {
    store: Arc<dyn ArtifactStore>,
    gate: Arc<dyn CredentialGate>,
}

impl CertBackend {
    pub fn new(store: Arc<dyn ArtifactStore>, gate: Arc<dyn CredentialGate>) -> Self {
        Self { store, gate }
    }

    /// Renewal information of `domain`
    pub async fn fetch_info(&self, domain: &str, key: &ApiKey) -> Result<RenewalInfo, BackendError> {
        let scoped = self.open(domain, ItemKind::Info, key)?;
        let name = resolver::meta_name(domain);
        read_info(&*scoped, &name).await
    }

    /// Serial of the current certificate of `domain`
    pub async fn fetch_serial(&self, domain: &str, key: &ApiKey) -> Result<String, BackendError> {
        self.fetch_info(domain, key).await.map(|info| info.serial)
    }

    /// Fetch one item of `domain`
    ///
    /// Archives carry the modification time and size of the certificate
    /// artifact they were built from.
    pub async fn fetch_item(
        &self,
        domain: &str,
        kind: ItemKind,
        key: &ApiKey,
    ) -> Result<ResultItem, BackendError> {
        let scoped = self.open(domain, kind, key)?;
        let artifacts = resolver::resolve(domain, kind);
        let stat = scoped.stat(artifacts.stat_name()).await?;

        let data = match &artifacts {
            Artifacts::Metadata(name) => {
                let info = read_info(&*scoped, name).await?;
                let json = serde_json::to_vec(&info)
                    .map_err(|e| BackendError::Store(format!("failed to serialize {}: {}", name, e)))?;
                Bytes::from(json)
            }
            Artifacts::Pem(name) => scoped.read(name).await?,
            Artifacts::Archive {
                key: key_name,
                cert,
                with_chain,
            } => {
                let key_pem = scoped.read(key_name).await?;
                let cert_pem = scoped.read(cert).await?;
                let encoded = if *with_chain {
                    archive::encode_chain(&key_pem, &cert_pem)
                } else {
                    archive::encode_single(&key_pem, &cert_pem)
                };
                let der = encoded.map_err(|e| {
                    warn!(domain = %domain, kind = %kind, error = %e, "Archive assembly failed");
                    BackendError::from_archive(e, key_name, cert)
                })?;
                Bytes::from(der)
            }
        };

        debug!(
            domain = %domain,
            kind = %kind,
            bytes = data.len(),
            "Fetched item"
        );
        Ok(result_item(data, stat))
    }

    /// Modification time and size a [`Self::fetch_item`] would report, without reading
    pub async fn stat_item(
        &self,
        domain: &str,
        kind: ItemKind,
        key: &ApiKey,
    ) -> Result<ItemStat, BackendError> {
        let scoped = self.open(domain, kind, key)?;
        let artifacts = resolver::resolve(domain, kind);
        let stat = scoped.stat(artifacts.stat_name()).await?;
        Ok(ItemStat {
            mod_time: stat.mod_time,
            size: stat.size,
        })
    }

    /// Parse a requested item kind of `domain`
    ///
    /// An unknown kind is reported only to callers holding a credential for
    /// the domain; everyone else gets `Unauthorized`.
    pub fn parse_kind(&self, domain: &str, item: &str, key: &ApiKey) -> Result<ItemKind, BackendError> {
        item.parse::<ItemKind>().map_err(|e| {
            if self.gate.has_access(domain, ItemKind::Info, key) {
                BackendError::from(e)
            } else {
                warn!(domain = %domain.escape_debug(), item = %item.escape_debug(), "Unauthorized request");
                BackendError::Unauthorized
            }
        })
    }

    /// Authorize, then scope the store to `domain`
    fn open(&self, domain: &str, kind: ItemKind, key: &ApiKey) -> Result<Box<dyn DomainStore>, BackendError> {
        if !self.gate.has_access(domain, kind, key) {
            warn!(domain = %domain.escape_debug(), kind = %kind, "Unauthorized request");
            return Err(BackendError::Unauthorized);
        }
        Ok(self.store.scope(domain)?)
    }
}

async fn read_info(scoped: &dyn DomainStore, name: &str) -> Result<RenewalInfo, BackendError> {
    let bytes = scoped.read(name).await?;
    metadata::parse(&bytes).map_err(|source| {
        warn!(
            domain = %scoped.domain(),
            artifact = %name,
            error = %source,
            "Malformed metadata"
        );
        BackendError::MalformedMetadata {
            artifact: name.to_string(),
            source,
        }
    })
}

fn result_item(data: Bytes, stat: ArtifactStat) -> ResultItem {
    ResultItem {
        data,
        mod_time: stat.mod_time,
        size: stat.size,
    }
}
