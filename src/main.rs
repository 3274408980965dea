//! Texnouz OCPI eMSP service
//!
//! Receives OCPI 2.2.1 tariffs pushed by CPOs.
//!
//! ```sh
//! # Run with default config (~/.config/texnouz-ocpi/config.toml)
//! ocpi-emsp-service
//!
//! # Custom config path
//! ocpi-emsp-service --config /etc/texnouz-ocpi/config.toml
//!
//! # Validate config without starting
//! ocpi-emsp-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use texnouz_ocpi::config::AppConfig;
use texnouz_ocpi::server::{init_tracing, ServerHandle, ServerOptions};

/// Texnouz OCPI eMSP: tariffs receiver for CPO pushes.
#[derive(Parser, Debug)]
#[command(
    name = "ocpi-emsp-service",
    version,
    about = "OCPI 2.2.1 eMSP tariffs receiver",
    long_about = "Texnouz OCPI eMSP: REST API that stores the tariffs CPOs push \
                  over the OCPI 2.2.1 Tariffs module.\n\n\
                  Default config: ~/.config/texnouz-ocpi/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "OCPI_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(texnouz_ocpi::default_config_path);

    let loaded = AppConfig::load(&config_path);
    if cli.check {
        if let Err(e) = &loaded {
            eprintln!("❌ Invalid configuration {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
    }
    let (mut config, load_error) = match loaded {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("✅ Configuration is valid");
        println!("   Config file   : {}", config_path.display());
        println!("   API address   : {}", config.server.address());
        println!("   Database      : {}", config.database.connection_url());
        println!("   Delete policy : {:?}", config.ocpi.delete_policy);
        println!("   OCPI tokens   : {}", config.ocpi.tokens.len());
        println!("   Log level     : {}", config.logging.level);
        return Ok(());
    }

    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    // Install OS signal handlers (SIGTERM, SIGINT)
    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;

    Ok(())
}
