//! Tariff synchronization service
//!
//! Receives the three CPO-facing operations of the OCPI tariffs receiver
//! interface. Requests are addressed by a (country_code, party_id,
//! tariff_id) triple; the service resolves it to a canonical [`TariffKey`],
//! checks that a pushed body agrees with it, and delegates to the store.
//! It keeps no state of its own and is shared across requests behind `Arc`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::tariff::repository::not_found;
use crate::domain::{DomainError, DomainResult, Tariff, TariffKey, TariffRepository};

/// What to answer when a CPO deletes a tariff that is not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Report `NotFound` (HTTP 404).
    #[default]
    Strict,
    /// Treat the delete as already done.
    Idempotent,
}

/// Address of a tariff as given by the caller, before canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TariffRequest {
    pub country_code: String,
    pub party_id: String,
    pub tariff_id: String,
}

impl TariffRequest {
    pub fn new(
        country_code: impl Into<String>,
        party_id: impl Into<String>,
        tariff_id: impl Into<String>,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            party_id: party_id.into(),
            tariff_id: tariff_id.into(),
        }
    }

    pub fn key(&self) -> TariffKey {
        TariffKey::new(&self.country_code, &self.party_id, self.tariff_id.as_str())
    }
}

/// Service for the eMSP tariffs receiver
pub struct TariffService {
    tariffs: Arc<dyn TariffRepository>,
    delete_policy: DeletePolicy,
}

impl TariffService {
    pub fn new(tariffs: Arc<dyn TariffRepository>) -> Self {
        Self {
            tariffs,
            delete_policy: DeletePolicy::default(),
        }
    }

    pub fn with_delete_policy(mut self, delete_policy: DeletePolicy) -> Self {
        self.delete_policy = delete_policy;
        self
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    /// Tariff as currently stored for the request key.
    pub async fn get_tariff(&self, request: &TariffRequest) -> DomainResult<Tariff> {
        let key = request.key();
        let result = self
            .tariffs
            .find_by_key(&key)
            .await
            .and_then(|found| found.ok_or_else(|| not_found(&key)));

        match &result {
            Ok(_) => debug!("Tariff {} served", key),
            Err(e) => debug!("Tariff {} lookup failed: {}", key, e),
        }
        record("get", &result);
        result
    }

    /// Create or fully replace the tariff at the request key.
    ///
    /// The body's own `country_code`, `party_id` and `id` must address the
    /// same tariff as the request; a disagreement is rejected, never fixed up.
    pub async fn save_tariff(&self, tariff: Tariff, request: &TariffRequest) -> DomainResult<()> {
        let key = request.key();
        let result = self.store(&key, tariff).await;

        match &result {
            Ok(()) => info!("Tariff {} stored", key),
            Err(e) if e.is_client_error() => warn!("Tariff {} rejected: {}", key, e),
            Err(e) => warn!("Tariff {} not stored: {}", key, e),
        }
        record("put", &result);
        result
    }

    /// Remove the tariff at the request key.
    pub async fn delete_tariff(&self, request: &TariffRequest) -> DomainResult<()> {
        let key = request.key();
        let result = match self.tariffs.delete(&key).await {
            Err(DomainError::NotFound { .. }) if self.delete_policy == DeletePolicy::Idempotent => {
                debug!("Tariff {} already absent", key);
                Ok(())
            }
            other => other,
        };

        match &result {
            Ok(()) => info!("Tariff {} deleted", key),
            Err(e) => warn!("Tariff {} not deleted: {}", key, e),
        }
        record("delete", &result);
        result
    }

    async fn store(&self, key: &TariffKey, tariff: Tariff) -> DomainResult<()> {
        check_identity(&tariff, key)?;
        tariff.check_shape()?;
        self.tariffs.upsert(key, tariff).await
    }
}

fn check_identity(tariff: &Tariff, key: &TariffKey) -> DomainResult<()> {
    let mismatch = |field: &'static str, expected: &str, actual: &str| DomainError::IdentityMismatch {
        field,
        expected: expected.to_string(),
        actual: actual.to_string(),
    };

    if !tariff.country_code.eq_ignore_ascii_case(key.country_code()) {
        return Err(mismatch("country_code", key.country_code(), &tariff.country_code));
    }
    if !tariff.party_id.eq_ignore_ascii_case(key.party_id()) {
        return Err(mismatch("party_id", key.party_id(), &tariff.party_id));
    }
    if tariff.id != key.tariff_id() {
        return Err(mismatch("id", key.tariff_id(), &tariff.id));
    }
    Ok(())
}

fn record<T>(operation: &'static str, result: &DomainResult<T>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(DomainError::NotFound { .. }) => "not_found",
        Err(e) if e.is_client_error() => "rejected",
        Err(_) => "error",
    };
    metrics::counter!(
        "ocpi_tariff_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

// ── Tests ──────────────────────────────────────────────────────
