//! In-memory tariff store

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::tariff::repository::not_found;
use crate::domain::{DomainResult, Tariff, TariffKey, TariffRepository};

/// In-memory storage for development and testing.
///
/// Each key lives in one DashMap shard; the shard lock serializes
/// operations on the same key.
#[derive(Default)]
pub struct InMemoryTariffRepository {
    tariffs: DashMap<TariffKey, Tariff>,
}

impl InMemoryTariffRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tariffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tariffs.is_empty()
    }
}

#[async_trait]
impl TariffRepository for InMemoryTariffRepository {
    async fn find_by_key(&self, key: &TariffKey) -> DomainResult<Option<Tariff>> {
        Ok(self.tariffs.get(key).map(|t| t.clone()))
    }

    async fn upsert(&self, key: &TariffKey, tariff: Tariff) -> DomainResult<()> {
        if self.tariffs.insert(key.clone(), tariff).is_some() {
            debug!("Tariff {} replaced in memory", key);
        }
        Ok(())
    }

    async fn delete(&self, key: &TariffKey) -> DomainResult<()> {
        self.tariffs.remove(key).ok_or_else(|| not_found(key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tariff::model::tests::sample_tariff;
    use crate::domain::DomainError;

    #[tokio::test]
    async fn upsert_then_find() {
        let repo = InMemoryTariffRepository::new();
        let key = TariffKey::new("NL", "ABC", "T1");
        let tariff = sample_tariff("NL", "ABC", "T1");

        repo.upsert(&key, tariff.clone()).await.unwrap();

        assert_eq!(repo.find_by_key(&key).await.unwrap(), Some(tariff));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_record() {
        let repo = InMemoryTariffRepository::new();
        let key = TariffKey::new("NL", "ABC", "T1");
        let mut second = sample_tariff("NL", "ABC", "T1");
        second.currency = "USD".into();

        repo.upsert(&key, sample_tariff("NL", "ABC", "T1")).await.unwrap();
        repo.upsert(&key, second.clone()).await.unwrap();

        assert_eq!(repo.find_by_key(&key).await.unwrap(), Some(second));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_key_is_not_found() {
        let repo = InMemoryTariffRepository::new();
        let err = repo
            .delete(&TariffKey::new("NL", "ABC", "missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Tariff", .. }));
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let repo = InMemoryTariffRepository::new();
        let key = TariffKey::new("NL", "ABC", "T1");
        repo.upsert(&key, sample_tariff("NL", "ABC", "T1")).await.unwrap();

        repo.delete(&key).await.unwrap();

        assert!(repo.is_empty());
        assert_eq!(repo.find_by_key(&key).await.unwrap(), None);
    }
}
