//! SeaORM implementation of TariffRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::debug;

use crate::domain::tariff::repository::not_found;
use crate::domain::{DomainError, DomainResult, Tariff, TariffKey, TariffRepository};
use crate::infrastructure::database::entities::tariff;
use crate::shared::errors::InfraError;

// ── Conversion helpers ──────────────────────────────────────────

fn db_err(e: sea_orm::DbErr) -> DomainError {
    InfraError::Database(e).into()
}

fn entity_to_domain(model: tariff::Model) -> DomainResult<Tariff> {
    serde_json::from_str(&model.document).map_err(|e| InfraError::Serialization(e).into())
}

fn key_filter<Q: QueryFilter>(query: Q, key: &TariffKey) -> Q {
    query
        .filter(tariff::Column::CountryCode.eq(key.country_code()))
        .filter(tariff::Column::PartyId.eq(key.party_id()))
        .filter(tariff::Column::TariffId.eq(key.tariff_id()))
}

// ── SeaOrmTariffRepository ──────────────────────────────────────

pub struct SeaOrmTariffRepository {
    db: DatabaseConnection,
}

impl SeaOrmTariffRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TariffRepository for SeaOrmTariffRepository {
    async fn find_by_key(&self, key: &TariffKey) -> DomainResult<Option<Tariff>> {
        let model = key_filter(tariff::Entity::find(), key)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(entity_to_domain).transpose()
    }

    async fn upsert(&self, key: &TariffKey, t: Tariff) -> DomainResult<()> {
        let now = Utc::now();
        let document = serde_json::to_string(&t).map_err(InfraError::Serialization)?;
        let model = tariff::ActiveModel {
            id: NotSet,
            country_code: Set(key.country_code().to_string()),
            party_id: Set(key.party_id().to_string()),
            tariff_id: Set(key.tariff_id().to_string()),
            currency: Set(t.currency),
            document: Set(document),
            last_updated: Set(t.last_updated),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // Single statement, so a concurrent writer on the same key can only
        // land before or after this one.
        tariff::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    tariff::Column::CountryCode,
                    tariff::Column::PartyId,
                    tariff::Column::TariffId,
                ])
                .update_columns([
                    tariff::Column::Currency,
                    tariff::Column::Document,
                    tariff::Column::LastUpdated,
                    tariff::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        debug!("Tariff {} stored", key);
        Ok(())
    }

    async fn delete(&self, key: &TariffKey) -> DomainResult<()> {
        let result = key_filter(tariff::Entity::delete_many(), key)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(not_found(key));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::PaginatorTrait;
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::domain::tariff::model::tests::sample_tariff;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, DatabaseConfig};

    async fn repo() -> (SeaOrmTariffRepository, DatabaseConnection) {
        let db = init_database(&DatabaseConfig::sqlite_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        (SeaOrmTariffRepository::new(db.clone()), db)
    }

    #[tokio::test]
    async fn upsert_then_find_returns_same_tariff() {
        let (repo, _db) = repo().await;
        let key = TariffKey::new("NL", "ABC", "T1");
        let tariff = sample_tariff("NL", "ABC", "T1");

        repo.upsert(&key, tariff.clone()).await.unwrap();

        assert_eq!(repo.find_by_key(&key).await.unwrap(), Some(tariff));
    }

    #[tokio::test]
    async fn upsert_replaces_instead_of_inserting_twice() {
        let (repo, db) = repo().await;
        let key = TariffKey::new("NL", "ABC", "T1");
        let mut second = sample_tariff("NL", "ABC", "T1");
        second.currency = "USD".into();
        second.tariff_alt_text.clear();

        repo.upsert(&key, sample_tariff("NL", "ABC", "T1")).await.unwrap();
        let created = tariff::Entity::find().one(&db).await.unwrap().unwrap().created_at;
        repo.upsert(&key, second.clone()).await.unwrap();

        assert_eq!(repo.find_by_key(&key).await.unwrap(), Some(second));
        assert_eq!(tariff::Entity::find().count(&db).await.unwrap(), 1);
        let row = tariff::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(row.currency, "USD");
        assert_eq!(row.created_at, created);
    }

    #[tokio::test]
    async fn keys_are_stored_canonical() {
        let (repo, db) = repo().await;
        let key = TariffKey::new("nl", "abc", "T1");

        repo.upsert(&key, sample_tariff("nl", "abc", "T1")).await.unwrap();

        let row = tariff::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!((row.country_code.as_str(), row.party_id.as_str()), ("NL", "ABC"));
        assert!(repo
            .find_by_key(&TariffKey::new("NL", "ABC", "T1"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn find_missing_returns_none() {
        let (repo, _db) = repo().await;
        let found = repo.find_by_key(&TariffKey::new("NL", "ABC", "nope")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn delete_removes_row_and_reports_missing() {
        let (repo, _db) = repo().await;
        let key = TariffKey::new("NL", "ABC", "T1");
        repo.upsert(&key, sample_tariff("NL", "ABC", "T1")).await.unwrap();

        repo.delete(&key).await.unwrap();
        assert!(repo.find_by_key(&key).await.unwrap().is_none());

        let err = repo.delete(&key).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_on_shared_file_leave_one_row() {
        use std::sync::Arc;

        use crate::application::{TariffRequest, TariffService};
        use crate::config::PoolConfig;

        let path = std::env::temp_dir().join(format!("ocpi-tariffs-{}.db", uuid::Uuid::new_v4()));
        let db = init_database(&DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", path.display()),
            pool: PoolConfig {
                max_connections: 4,
                ..PoolConfig::default()
            },
        })
        .await
        .unwrap();
        Migrator::up(&db, None).await.unwrap();
        let service = Arc::new(TariffService::new(Arc::new(SeaOrmTariffRepository::new(
            db.clone(),
        ))));
        let request = TariffRequest::new("NL", "ABC", "T1");

        let candidates: Vec<Tariff> = (0..32)
            .map(|i| {
                let mut t = sample_tariff("NL", "ABC", "T1");
                t.currency = format!("C{:02}", i);
                t.tariff_alt_text[0].text = format!("version {}", i);
                t
            })
            .collect();

        let handles: Vec<_> = candidates
            .iter()
            .cloned()
            .map(|t| {
                let service = service.clone();
                let request = request.clone();
                tokio::spawn(async move { service.save_tariff(t, &request).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(tariff::Entity::find().count(&db).await.unwrap(), 1);
        let stored = service.get_tariff(&request).await.unwrap();
        assert!(candidates.contains(&stored));
        let row = tariff::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(row.currency, stored.currency);

        db.close().await.unwrap();
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn corrupt_document_surfaces_as_storage_error() {
        let (repo, db) = repo().await;
        let key = TariffKey::new("NL", "ABC", "T1");
        repo.upsert(&key, sample_tariff("NL", "ABC", "T1")).await.unwrap();

        let row = tariff::Entity::find().one(&db).await.unwrap().unwrap();
        let mut active: tariff::ActiveModel = row.into();
        active.document = Set("{not json".to_string());
        sea_orm::ActiveModelTrait::update(active, &db).await.unwrap();

        let err = repo.find_by_key(&key).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage(ref msg) if msg.starts_with("Serialization error")));
    }
}
