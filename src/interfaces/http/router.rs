//! API Router with Swagger UI

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::TariffService;
use crate::domain::tariff::{
    DayOfWeek, DisplayText, EnergyMix, EnergySource, EnergySourceCategory, EnvironmentalImpact,
    EnvironmentalImpactCategory, Price, PriceComponent, ReservationRestrictionType, Tariff,
    TariffDimensionType, TariffElement, TariffRestrictions, TariffType,
};
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{ocpi_auth_middleware, OcpiAuthState};
use crate::interfaces::http::modules::health::{self, HealthState};
use crate::interfaces::http::modules::metrics::{self, MetricsState};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::tariffs::{self, TariffHandlerState, TARIFFS_PATH};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "ocpi_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "OCPI credentials token: `Token <base64 token>`",
                ))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        tariffs::get_tariff,
        tariffs::put_tariff,
        tariffs::delete_tariff,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            health::ComponentHealth,
            Tariff,
            TariffType,
            DisplayText,
            Price,
            TariffElement,
            PriceComponent,
            TariffDimensionType,
            TariffRestrictions,
            DayOfWeek,
            ReservationRestrictionType,
            EnergyMix,
            EnergySource,
            EnergySourceCategory,
            EnvironmentalImpact,
            EnvironmentalImpactCategory,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Tariffs", description = "OCPI 2.2.1 eMSP tariffs receiver: CPOs push, replace and remove tariffs"),
    ),
    info(
        title = "Texnouz OCPI eMSP API",
        version = "1.0.0",
        description = "OCPI 2.2.1 eMSP receiver interface for CPO tariffs",
        license(name = "MIT"),
        contact(name = "Texnouz", email = "support@texnouz.com")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
///
/// `/metrics` is only mounted when a Prometheus recorder is installed.
pub fn create_api_router(
    tariff_service: Arc<TariffService>,
    auth: OcpiAuthState,
    health_state: HealthState,
    prometheus: Option<PrometheusHandle>,
) -> Router {
    // Tariff routes (protected)
    let tariff_routes = Router::new()
        .route(
            TARIFFS_PATH,
            get(tariffs::get_tariff)
                .put(tariffs::put_tariff)
                .delete(tariffs::delete_tariff),
        )
        .layer(middleware::from_fn_with_state(auth, ocpi_auth_middleware))
        .with_state(TariffHandlerState {
            service: tariff_service,
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health_state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(tariff_routes);

    if let Some(handle) = prometheus {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
