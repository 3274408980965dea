//! # Texnouz OCPI eMSP
//!
//! OCPI 2.2.1 Tariffs module, eMSP (receiver) side: CPOs push, replace and
//! remove the tariffs they apply, and the eMSP serves back what it stored.
//!
//! ## Architecture
//!
//! - **domain**: Tariff object, canonical key, store trait
//! - **application**: Tariff synchronization service
//! - **infrastructure**: SQLite (SeaORM) and in-memory tariff stores
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: Runtime lifecycle and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, InMemoryTariffRepository, SeaOrmTariffRepository};

pub use interfaces::http::create_api_router;
