//! SeaORM entities

pub mod tariff;
