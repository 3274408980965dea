pub mod tariff;

// Re-export commonly used types
pub use tariff::{Tariff, TariffKey, TariffRepository};

pub use crate::shared::errors::{DomainError, DomainResult};
