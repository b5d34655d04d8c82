//! Certvault Server Library
//!
//! Distributes X.509 material (private keys, leaf certificates, chains and
//! PKCS#12 bundles) to authorized clients and reports renewal metadata.
//!
//! - **Backend**: credential gate, domain-scoped artifact store, item
//!   resolution, metadata parsing and PKCS#12 assembly
//! - **HTTP**: axum routes over the backend, optional TLS termination
//! - **Reload**: SIGHUP re-reads the credential file without a restart
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use certvault_server::{CertBackend, FsArtifactStore, ReloadableGate};
//!
//! let gate = Arc::new(ReloadableGate::load("./data/auth.json")?);
//! let backend = CertBackend::new(Arc::new(FsArtifactStore::new("./data")), gate);
//! let info = backend.fetch_info("example.com", &"api-key".into()).await?;
//! ```

pub mod app;
pub mod backend;
pub mod http;
pub mod reload;

pub use app::App;
pub use backend::{
    ArtifactStore, BackendError, CertBackend, CredentialGate, FsArtifactStore, ReloadableGate,
    StaticGate,
};
pub use http::{router, AppState};
pub use reload::{Shutdown, ShutdownSignal};
