use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{health, server_configs};
use crate::config::PortalSettings;
use crate::remote::ConfigServiceApi;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub settings: PortalSettings,
    pub config_service: Arc<dyn ConfigServiceApi>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        server_configs::create_or_update,
        server_configs::add_config_service,
        server_configs::find_all_server_configs,
        server_configs::find_all_config_service,
        server_configs::load_server_config,
    ),
    components(schemas(
        server_configs::WriteServerConfigRequest,
        crate::database::entities::server_configs::Model,
        crate::remote::ServerConfigDTO,
    ))
)]
struct ApiDoc;

pub async fn create_app(
    db: DatabaseConnection,
    settings: PortalSettings,
    config_service: Arc<dyn ConfigServiceApi>,
    cors_origin: Option<&str>,
) -> Result<Router> {
    let state = AppState {
        db,
        settings,
        config_service,
    };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<axum::http::HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        // Health check endpoint
        .route("/health", get(health::health_check))
        // Server-config routes; the static segments must stay registered
        // alongside the `:key` capture
        .route("/server/config", post(server_configs::create_or_update))
        .route(
            "/server/config/addConfigService",
            post(server_configs::add_config_service),
        )
        .route(
            "/server/config/findAll",
            get(server_configs::find_all_server_configs),
        )
        .route(
            "/server/config/findAllConfigService",
            get(server_configs::find_all_config_service),
        )
        .route(
            "/server/config/:key",
            get(server_configs::load_server_config),
        )
        // Swagger UI over the generated OpenAPI document
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}
