//! Client for the remote admin ("config service") API
//!
//! The admin service keeps its own server-config table per environment.
//! The portal only needs three operations against it, so they are a small
//! trait; the HTTP implementation talks JSON to the per-environment base
//! URLs from the settings file. Tests substitute the trait with a mock.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::config::AdminServiceOptions;
use crate::errors::{PortalError, PortalResult};

/// Server-config record as the remote admin service exposes it.
///
/// `id` is `None` when the record does not exist remotely yet; a create
/// call sends no id and an update call carries the existing one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ServerConfigDTO {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub last_modified_by: Option<String>,
}

/// Operations the portal needs from the admin service
#[async_trait]
pub trait ConfigServiceApi: Send + Sync {
    /// Lists every server config the admin service holds for `env`
    async fn find_all(&self, env: &str) -> PortalResult<Vec<ServerConfigDTO>>;

    /// Creates a new server config in `env`
    async fn create(&self, env: &str, config: &ServerConfigDTO) -> PortalResult<()>;

    /// Updates an existing server config in `env`
    async fn update(&self, env: &str, config: &ServerConfigDTO) -> PortalResult<()>;
}

/// reqwest-backed implementation
pub struct HttpConfigServiceApi {
    client: reqwest::Client,
    options: AdminServiceOptions,
}

impl HttpConfigServiceApi {
    pub fn new(options: AdminServiceOptions) -> PortalResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| PortalError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, options })
    }

    fn url(&self, env: &str) -> PortalResult<String> {
        let base = self.options.endpoint(env)?;
        Ok(format!("{}/server/config", base.trim_end_matches('/')))
    }

    async fn check_status(env: &str, response: reqwest::Response) -> PortalResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(PortalError::Remote {
            env: env.to_string(),
            reason: format!("HTTP {}: {}", status, body),
        })
    }

    fn send_error(env: &str, err: reqwest::Error) -> PortalError {
        PortalError::Remote {
            env: env.to_string(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl ConfigServiceApi for HttpConfigServiceApi {
    async fn find_all(&self, env: &str) -> PortalResult<Vec<ServerConfigDTO>> {
        let url = self.url(env)?;
        debug!("Fetching server configs from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::send_error(env, e))?;

        Self::check_status(env, response)
            .await?
            .json::<Vec<ServerConfigDTO>>()
            .await
            .map_err(|e| PortalError::Remote {
                env: env.to_string(),
                reason: format!("Invalid response body: {}", e),
            })
    }

    async fn create(&self, env: &str, config: &ServerConfigDTO) -> PortalResult<()> {
        let url = self.url(env)?;
        debug!("Creating server config '{}' via {}", config.key, url);

        let response = self
            .client
            .post(&url)
            .json(config)
            .send()
            .await
            .map_err(|e| Self::send_error(env, e))?;

        Self::check_status(env, response).await?;
        Ok(())
    }

    async fn update(&self, env: &str, config: &ServerConfigDTO) -> PortalResult<()> {
        let url = self.url(env)?;
        debug!("Updating server config '{}' via {}", config.key, url);

        let response = self
            .client
            .put(&url)
            .json(config)
            .send()
            .await
            .map_err(|e| Self::send_error(env, e))?;

        Self::check_status(env, response).await?;
        Ok(())
    }
}
