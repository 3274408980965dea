//! Tariff REST API handlers
//!
//! CPOs push their tariffs here. All three operations address one tariff
//! through the `country_code`, `party_id` and `tariff_id` query parameters.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::dto::TariffQuery;
use crate::application::{TariffRequest, TariffService};
use crate::domain::Tariff;
use crate::interfaces::http::common::{error_response, ApiResponse, ErrorResponse, ValidatedJson};

/// Tariff handler state
#[derive(Clone)]
pub struct TariffHandlerState {
    pub service: Arc<TariffService>,
}

fn bad_request(message: impl Into<String>) -> ErrorResponse {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)))
}

fn parse_query(
    query: Result<Query<TariffQuery>, QueryRejection>,
) -> Result<TariffRequest, ErrorResponse> {
    let Query(query) = query.map_err(|e| bad_request(e.body_text()))?;
    query
        .validate()
        .map_err(|e| bad_request(format!("Invalid query parameters: {}", e)))?;
    Ok(query.into())
}

#[utoipa::path(
    get,
    path = "/emsp/api/2.2.1/tariffs",
    tag = "Tariffs",
    security(("ocpi_token" = [])),
    params(TariffQuery),
    responses(
        (status = 200, description = "Stored tariff", body = Tariff),
        (status = 400, description = "Missing or malformed query parameters", body = ApiResponse<String>),
        (status = 404, description = "Tariff not found", body = ApiResponse<String>)
    )
)]
pub async fn get_tariff(
    State(state): State<TariffHandlerState>,
    query: Result<Query<TariffQuery>, QueryRejection>,
) -> Result<Json<Tariff>, ErrorResponse> {
    let request = parse_query(query)?;
    state
        .service
        .get_tariff(&request)
        .await
        .map(Json)
        .map_err(error_response)
}

#[utoipa::path(
    put,
    path = "/emsp/api/2.2.1/tariffs",
    tag = "Tariffs",
    security(("ocpi_token" = [])),
    params(TariffQuery),
    request_body = Tariff,
    responses(
        (status = 200, description = "Tariff created or replaced"),
        (status = 400, description = "Malformed body, schema violation or identity mismatch", body = ApiResponse<String>)
    )
)]
pub async fn put_tariff(
    State(state): State<TariffHandlerState>,
    query: Result<Query<TariffQuery>, QueryRejection>,
    ValidatedJson(tariff): ValidatedJson<Tariff>,
) -> Result<StatusCode, ErrorResponse> {
    let request = parse_query(query)?;
    state
        .service
        .save_tariff(tariff, &request)
        .await
        .map(|()| StatusCode::OK)
        .map_err(error_response)
}

#[utoipa::path(
    delete,
    path = "/emsp/api/2.2.1/tariffs",
    tag = "Tariffs",
    security(("ocpi_token" = [])),
    params(TariffQuery),
    responses(
        (status = 200, description = "Tariff removed"),
        (status = 400, description = "Missing or malformed query parameters", body = ApiResponse<String>),
        (status = 404, description = "Tariff not found", body = ApiResponse<String>)
    )
)]
pub async fn delete_tariff(
    State(state): State<TariffHandlerState>,
    query: Result<Query<TariffQuery>, QueryRejection>,
) -> Result<StatusCode, ErrorResponse> {
    let request = parse_query(query)?;
    state
        .service
        .delete_tariff(&request)
        .await
        .map(|()| StatusCode::OK)
        .map_err(error_response)
}
