//! Certificate distribution backend
//!
//! Authorizes a request, locates the stored artifacts of a domain and, for
//! PKCS#12 items, assembles the archive on the fly. The HTTP layer only
//! talks to [`CertBackend`].

pub mod archive;
pub mod auth;
pub mod dispatcher;
pub mod error;
pub mod metadata;
pub mod resolver;
pub mod store;

#[cfg(test)]
mod testutil;

pub use archive::{ArchiveError, DEFAULT_PASSWORD};
pub use auth::{CredentialGate, ReloadableGate, StaticGate};
pub use dispatcher::CertBackend;
pub use error::{BackendError, StoreError};
pub use metadata::MetadataError;
pub use resolver::{resolve, Artifacts};
pub use store::{ArtifactStat, ArtifactStore, DomainStore, FsArtifactStore};
