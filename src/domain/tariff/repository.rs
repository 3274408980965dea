//! Tariff store interface

use async_trait::async_trait;

use super::key::TariffKey;
use super::model::Tariff;
use crate::domain::{DomainError, DomainResult};

/// Keyed storage for CPO tariffs.
///
/// Implementations must make each operation atomic for its key: concurrent
/// calls on one key observe a single total order, calls on different keys
/// do not block each other.
#[async_trait]
pub trait TariffRepository: Send + Sync {
    async fn find_by_key(&self, key: &TariffKey) -> DomainResult<Option<Tariff>>;

    /// Insert or fully replace the record at `key`.
    async fn upsert(&self, key: &TariffKey, tariff: Tariff) -> DomainResult<()>;

    /// Remove the record at `key`; `DomainError::NotFound` when absent.
    async fn delete(&self, key: &TariffKey) -> DomainResult<()>;
}

pub(crate) fn not_found(key: &TariffKey) -> DomainError {
    DomainError::NotFound {
        entity: "Tariff",
        field: "key",
        value: key.to_string(),
    }
}
