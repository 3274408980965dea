//! Tariff synchronization use cases (CPO → eMSP push)

pub mod service;

pub use service::{DeletePolicy, TariffRequest, TariffService};
