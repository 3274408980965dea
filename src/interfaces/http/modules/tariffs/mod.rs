//! OCPI 2.2.1 Tariffs receiver endpoints

pub mod dto;
pub mod handlers;

pub use dto::TariffQuery;
pub use handlers::*;

/// Base path of the eMSP tariffs module
pub const TARIFFS_PATH: &str = "/emsp/api/2.2.1/tariffs";
