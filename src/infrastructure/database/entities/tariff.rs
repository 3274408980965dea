//! Tariff entity - one row per CPO tariff

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Stored tariff. The full OCPI object lives in `document`; the key columns
/// hold the canonical (upper-cased) key.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tariffs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// ISO-3166 alpha-2 country code of the owning CPO
    pub country_code: String,

    /// Party ID of the owning CPO
    pub party_id: String,

    /// CPO-assigned tariff id
    pub tariff_id: String,

    /// ISO-4217 currency, copied from the document
    pub currency: String,

    /// Serialized OCPI Tariff object
    #[sea_orm(column_type = "Text")]
    pub document: String,

    /// `last_updated` as declared by the CPO
    pub last_updated: DateTime<Utc>,

    /// When the key was first pushed
    pub created_at: DateTime<Utc>,

    /// When the record was last replaced
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
