//! Tariff request parameters

use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::application::TariffRequest;

/// Address of the tariff, as sent by the CPO
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TariffQuery {
    /// ISO-3166 alpha-2 country code of the CPO
    #[validate(length(equal = 2, message = "country_code must be 2 characters"))]
    pub country_code: String,
    /// ID of the CPO
    #[validate(length(equal = 3, message = "party_id must be 3 characters"))]
    pub party_id: String,
    /// Tariff ID, unique within the CPO
    #[validate(length(min = 1, max = 36, message = "tariff_id must be 1 to 36 characters"))]
    pub tariff_id: String,
}

impl From<TariffQuery> for TariffRequest {
    fn from(q: TariffQuery) -> Self {
        TariffRequest::new(q.country_code, q.party_id, q.tariff_id)
    }
}
