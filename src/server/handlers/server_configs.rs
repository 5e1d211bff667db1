use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::auth::RequestIdentity;
use crate::database::entities::server_configs;
use crate::errors::PortalError;
use crate::pagination::PageQuery;
use crate::remote::ServerConfigDTO;
use crate::server::app::AppState;
use crate::services::{RemoteConfigService, ServerConfigService, ServerConfigWrite};

#[derive(Debug, Deserialize, ToSchema)]
pub struct WriteServerConfigRequest {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub comment: Option<String>,
}

impl From<WriteServerConfigRequest> for ServerConfigWrite {
    fn from(request: WriteServerConfigRequest) -> Self {
        Self {
            key: request.key,
            value: request.value,
            comment: request.comment,
        }
    }
}

/// Target environment for the remote-facing operations; defaults to the
/// first active environment when absent.
#[derive(Debug, Deserialize, IntoParams)]
pub struct EnvQuery {
    #[serde(default)]
    pub env: Option<String>,
}

/// Create a config on first write to a key, merge onto it afterwards
#[utoipa::path(
    post,
    path = "/server/config",
    request_body = WriteServerConfigRequest,
    responses(
        (status = 200, description = "Persisted config", body = server_configs::Model),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "No authenticated user"),
        (status = 403, description = "Caller is not a super admin")
    )
)]
pub async fn create_or_update(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Json(payload): Json<WriteServerConfigRequest>,
) -> Result<Json<server_configs::Model>, PortalError> {
    let user = identity.require_super_admin()?;
    info!("User '{}' writing server config '{}'", user.user_id, payload.key);

    let service = ServerConfigService::new(state.db.clone());
    let saved = service.save(payload.into(), &user.user_id).await?;

    Ok(Json(saved))
}

/// Push a config to the remote config service for an environment
#[utoipa::path(
    post,
    path = "/server/config/addConfigService",
    request_body = WriteServerConfigRequest,
    params(EnvQuery),
    responses(
        (status = 204, description = "Config created or updated remotely"),
        (status = 400, description = "Invalid payload or inactive environment"),
        (status = 502, description = "Remote config service failed"),
        (status = 503, description = "No active environment configured")
    )
)]
pub async fn add_config_service(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Query(query): Query<EnvQuery>,
    Json(payload): Json<WriteServerConfigRequest>,
) -> Result<StatusCode, PortalError> {
    let service = RemoteConfigService::new(state.config_service.clone(), state.settings.clone());
    service
        .push(query.env.as_deref(), payload.into(), identity.user_id())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List local configs page by page
#[utoipa::path(
    get,
    path = "/server/config/findAll",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of configs", body = [server_configs::Model]),
        (status = 400, description = "Invalid page parameters"),
        (status = 401, description = "No authenticated user"),
        (status = 403, description = "Caller is not a super admin")
    )
)]
pub async fn find_all_server_configs(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<server_configs::Model>>, PortalError> {
    identity.require_super_admin()?;
    let page = query.validate()?;

    let configs = ServerConfigService::new(state.db.clone()).list(page).await?;

    Ok(Json(configs))
}

/// List remote configs page by page for an environment
#[utoipa::path(
    get,
    path = "/server/config/findAllConfigService",
    params(PageQuery, EnvQuery),
    responses(
        (status = 200, description = "One page of remote configs", body = [ServerConfigDTO]),
        (status = 400, description = "Invalid page parameters or inactive environment"),
        (status = 502, description = "Remote config service failed"),
        (status = 503, description = "No active environment configured")
    )
)]
pub async fn find_all_config_service(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Query(env): Query<EnvQuery>,
) -> Result<Json<Vec<ServerConfigDTO>>, PortalError> {
    let page = query.validate()?;

    let service = RemoteConfigService::new(state.config_service.clone(), state.settings.clone());
    let configs = service.list(env.env.as_deref(), page).await?;

    Ok(Json(configs))
}

/// Fetch a single config by key
#[utoipa::path(
    get,
    path = "/server/config/{key}",
    params(
        ("key" = String, Path, description = "Config key")
    ),
    responses(
        (status = 200, description = "Config found", body = server_configs::Model),
        (status = 401, description = "No authenticated user"),
        (status = 403, description = "Caller is not a super admin"),
        (status = 404, description = "Config not found")
    )
)]
pub async fn load_server_config(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Path(key): Path<String>,
) -> Result<Json<server_configs::Model>, PortalError> {
    identity.require_super_admin()?;

    let config = ServerConfigService::new(state.db.clone())
        .get_by_key(&key)
        .await?;

    Ok(Json(config))
}
