//! Application layer - use cases on top of the domain

pub mod tariffs;

pub use tariffs::{DeletePolicy, TariffRequest, TariffService};
