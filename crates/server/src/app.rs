//! Application wiring: configuration to running server.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tracing::info;

use certvault_config::Config;

use crate::backend::{CertBackend, FsArtifactStore, ReloadableGate};
use crate::http::{self, AppState};
use crate::reload::{self, Shutdown};

/// A configured service instance
pub struct App {
    config: Config,
    gate: Arc<ReloadableGate>,
    backend: CertBackend,
}

impl App {
    /// Open the artifact store and load the credential file
    pub fn from_config(config: Config) -> Result<Self> {
        let store = FsArtifactStore::new(&config.storage.base_dir);
        let gate = Arc::new(
            ReloadableGate::load(&config.auth.file).context("Failed to load credential file")?,
        );
        let backend = CertBackend::new(Arc::new(store), gate.clone());

        info!(
            base_dir = %config.storage.base_dir.display(),
            credentials = gate.len(),
            server_id = %config.server.id,
            "Certificate backend ready"
        );

        Ok(Self {
            config,
            gate,
            backend,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gate(&self) -> &Arc<ReloadableGate> {
        &self.gate
    }

    pub fn backend(&self) -> &CertBackend {
        &self.backend
    }

    pub fn router(&self) -> Router {
        http::router(AppState {
            backend: self.backend.clone(),
            server_id: self.config.server.id,
        })
    }

    /// Serve until SIGTERM or SIGINT
    pub async fn run(self) -> Result<()> {
        let shutdown = Arc::new(Shutdown::new());
        reload::spawn_signal_loop(self.gate.clone(), shutdown.clone())
            .context("Failed to install signal handlers")?;

        http::serve(&self.config.listener, self.router(), shutdown.signal()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_config_loads_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let auth = temp_dir.path().join("auth.json");
        fs::write(&auth, r#"{"k1": "example.com", "k2": "other.com"}"#).unwrap();

        let mut config = Config::default();
        config.storage.base_dir = temp_dir.path().to_path_buf();
        config.auth.file = auth;

        let app = App::from_config(config).unwrap();
        assert_eq!(app.gate().len(), 2);
        assert_eq!(app.config().storage.base_dir, temp_dir.path());
    }

    #[test]
    fn test_from_config_requires_credential_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.auth.file = temp_dir.path().join("missing.json");

        let err = App::from_config(config).err().unwrap();
        assert!(err.to_string().contains("credential file"));
    }
}
