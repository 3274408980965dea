//! Storage implementations that live outside the database

mod memory;

pub use memory::InMemoryTariffRepository;
