//! eMSP server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: tariff store selection (SQLite
//! with migrations, or memory), the REST API, metrics and graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::TariffService;
use crate::config::{AppConfig, DbType};
use crate::domain::TariffRepository;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{
    init_database, DatabaseConfig, InMemoryTariffRepository, SeaOrmTariffRepository,
};
use crate::interfaces::http::create_api_router;
use crate::interfaces::http::middleware::OcpiAuthState;
use crate::interfaces::http::modules::health::HealthState;
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the eMSP service.
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running eMSP service.
///
/// # Examples
///
/// ```rust,no_run
/// use texnouz_ocpi::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Tariff service shared with the API handlers.
    pub tariff_service: Arc<TariffService>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the API listener is bound to.
    pub local_addr: SocketAddr,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

/// Prometheus recorder, installed at most once per process.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Some(handle.clone());
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("📊 Prometheus metrics recorder installed");
            Some(PROM_HANDLE.get_or_init(|| handle).clone())
        }
        Err(e) => {
            warn!("Prometheus metrics disabled: {}", e);
            PROM_HANDLE.get().cloned()
        }
    }
}

/// Tariff store for the configured driver, with the connection it uses.
async fn build_store(
    app_cfg: &AppConfig,
    auto_migrate: bool,
) -> Result<(Arc<dyn TariffRepository>, Option<DatabaseConnection>), Box<dyn std::error::Error>> {
    match app_cfg.database.driver {
        DbType::Memory => {
            warn!("Tariffs are kept in memory and lost on restart");
            Ok((Arc::new(InMemoryTariffRepository::new()), None))
        }
        DbType::Sqlite => {
            let db_config = DatabaseConfig {
                url: app_cfg.database.connection_url(),
                pool: app_cfg.database.pool.clone(),
            };
            let db = init_database(&db_config).await?;

            if auto_migrate {
                info!("Running database migrations...");
                Migrator::up(&db, None).await?;
                info!("Migrations completed");
            }

            Ok((Arc::new(SeaOrmTariffRepository::new(db.clone())), Some(db)))
        }
    }
}

fn backend_name(driver: DbType) -> &'static str {
    match driver {
        DbType::Sqlite => "sqlite",
        DbType::Memory => "memory",
    }
}

impl ServerHandle {
    /// Start the eMSP service with the given options.
    ///
    /// This will:
    /// 1. Install the Prometheus metrics recorder
    /// 2. Open the tariff store (and migrate it, if enabled)
    /// 3. Start the REST API server (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;

        info!("Starting Texnouz OCPI eMSP...");

        let prometheus = prometheus_handle();

        // ── Store & Service ────────────────────────────────────
        let (tariffs, db) = build_store(&app_cfg, opts.auto_migrate).await?;
        let tariff_service = Arc::new(
            TariffService::new(tariffs).with_delete_policy(app_cfg.ocpi.delete_policy),
        );
        info!(
            "Tariff store: {}, delete policy: {:?}",
            backend_name(app_cfg.database.driver),
            app_cfg.ocpi.delete_policy
        );

        let auth = OcpiAuthState::new(app_cfg.ocpi.tokens.iter().cloned());
        if !auth.is_enabled() {
            warn!("⚠️  No OCPI tokens configured: tariff endpoints accept unauthenticated requests");
        }

        let health = HealthState::new(db.clone(), backend_name(app_cfg.database.driver));

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(tariff_service.clone(), auth, health, prometheus);

        let api_addr = app_cfg.server.address();
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        // A server that stops on its own still releases `wait`.
        let stopped = shutdown_signal.clone();
        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
            stopped.trigger();
        });

        info!("🚀 Server started.");

        Ok(Self {
            tariff_service,
            config: app_cfg,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop once shutdown has been triggered.
    ///
    /// In-flight requests get `server.shutdown_timeout` seconds to finish;
    /// the API task is aborted past that.
    pub async fn wait(self) {
        let mut api_task = self.api_task;
        let task = &mut api_task;

        let completed = self
            .shutdown
            .shutdown_with_cleanup(move || async move {
                match task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
            })
            .await;
        if !completed {
            api_task.abort();
        }

        if let Some(db) = self.db {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("✅ Database connection closed");
            }
        }

        info!("👋 Texnouz OCPI eMSP shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down OCPI eMSP...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if the server is still running.
    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
