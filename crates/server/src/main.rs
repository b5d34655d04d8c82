//! Certvault - Main entry point
//!
//! Serves certificate material from a renewal client's storage directory.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use certvault_common::ServerId;
use certvault_config::{Config, TlsConfig};
use certvault_server::App;

/// Certvault - distributes certificates, keys and PKCS#12 bundles
#[derive(Parser, Debug)]
#[command(name = "certvault")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long = "config", env = "CERTVAULT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long = "verbose", global = true)]
    verbose: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Values that take precedence over the configuration file
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Directory holding one subdirectory per domain
    #[arg(long, env = "CERTVAULT_BASE_DIR", global = true)]
    base_dir: Option<PathBuf>,

    /// JSON file mapping API keys to domains
    #[arg(long, env = "CERTVAULT_AUTH_FILE", global = true)]
    auth_file: Option<PathBuf>,

    /// Listen address
    #[arg(long, env = "CERTVAULT_ADDRESS", global = true)]
    address: Option<String>,

    /// TLS certificate (requires --tls-key)
    #[arg(long, env = "CERTVAULT_TLS_CERT", requires = "tls_key", global = true)]
    tls_cert: Option<PathBuf>,

    /// TLS private key (requires --tls-cert)
    #[arg(long, env = "CERTVAULT_TLS_KEY", requires = "tls_cert", global = true)]
    tls_key: Option<PathBuf>,

    /// Server identifier reported by /ping
    #[arg(long, env = "CERTVAULT_ID", global = true)]
    id: Option<ServerId>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(base_dir) = self.base_dir {
            config.storage.base_dir = base_dir;
        }
        if let Some(auth_file) = self.auth_file {
            config.auth.file = auth_file;
        }
        if let Some(address) = self.address {
            config.listener.address = address;
        }
        if let (Some(cert_file), Some(key_file)) = (self.tls_cert, self.tls_key) {
            config.listener.tls = Some(TlsConfig {
                cert_file,
                key_file,
            });
        }
        if let Some(id) = self.id {
            config.server.id = id;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate configuration and exit
    Test,
    /// Run the server (default)
    Run,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.overrides)?;

    match cli.command {
        Some(Commands::Test) => test_config(&config, cli.config.as_deref()),
        Some(Commands::Run) | None => run_server(config),
    }
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();
}

fn load_config(path: Option<&std::path::Path>, overrides: Overrides) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).context("Failed to load configuration file")?
        }
        None => {
            info!("No configuration specified, using defaults");
            Config::default()
        }
    };
    overrides.apply(&mut config);
    Ok(config)
}

/// Validate configuration and exit
fn test_config(config: &Config, path: Option<&std::path::Path>) -> Result<()> {
    let result = config.validate().context("Configuration validation failed")?;

    info!("Configuration test successful:");
    info!("  - storage: {}", config.storage.base_dir.display());
    info!("  - credentials: {}", config.auth.file.display());
    info!(
        "  - listener: {} ({})",
        config.listener.address,
        if config.listener.tls.is_some() { "https" } else { "http" }
    );
    info!("  - {} warning(s)", result.warnings.len());

    println!(
        "certvault: configuration {} test is successful",
        path.map(|p| p.display().to_string())
            .unwrap_or_else(|| "(defaults)".to_string())
    );
    Ok(())
}

fn run_server(config: Config) -> Result<()> {
    config.validate().context("Configuration validation failed")?;

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async {
        let app = App::from_config(config)?;
        info!("Certvault started");
        app.run().await
    });

    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}
