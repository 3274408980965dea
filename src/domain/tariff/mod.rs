//! Tariff aggregate
//!
//! The OCPI Tariff object, its canonical key, and the store interface.

pub mod key;
pub mod model;
pub mod repository;

pub use key::TariffKey;
pub use model::{
    DayOfWeek, DisplayText, EnergyMix, EnergySource, EnergySourceCategory, EnvironmentalImpact,
    EnvironmentalImpactCategory, Price, PriceComponent, ReservationRestrictionType, Tariff,
    TariffDimensionType, TariffElement, TariffRestrictions, TariffType,
};
pub use repository::TariffRepository;
