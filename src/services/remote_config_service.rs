//! Pass-through operations against the remote config service
//!
//! The admin service is reconciled by key: a write first lists the remote
//! configs for the target environment, then dispatches a create or an
//! update depending on whether the key already exists there. Local DB and
//! remote call are not linked by any transactional guarantee.

use std::sync::Arc;

use tracing::info;

use crate::config::PortalSettings;
use crate::errors::PortalResult;
use crate::pagination::Page;
use crate::remote::{ConfigServiceApi, ServerConfigDTO};
use crate::services::server_config_service::ServerConfigWrite;

pub struct RemoteConfigService {
    api: Arc<dyn ConfigServiceApi>,
    settings: PortalSettings,
}

impl RemoteConfigService {
    pub fn new(api: Arc<dyn ConfigServiceApi>, settings: PortalSettings) -> Self {
        Self { api, settings }
    }

    /// Writes a config to the admin service for the resolved environment.
    ///
    /// The remote listing is scanned linearly for the key; the remote set
    /// is small and administrator-only.
    pub async fn push(
        &self,
        env: Option<&str>,
        write: ServerConfigWrite,
        modified_by: &str,
    ) -> PortalResult<()> {
        write.validate()?;
        let env = self.settings.resolve_env(env)?;

        let listing = self.api.find_all(&env).await?;
        let existing = listing.iter().find(|item| item.key == write.key);

        let config = ServerConfigDTO {
            id: existing.and_then(|item| item.id),
            key: write.key,
            value: write.value,
            comment: write.comment,
            created_by: Some(modified_by.to_string()),
            last_modified_by: Some(modified_by.to_string()),
        };

        match existing {
            Some(_) => {
                info!("Updating config '{}' in environment '{}'", config.key, env);
                self.api.update(&env, &config).await
            }
            None => {
                info!("Creating config '{}' in environment '{}'", config.key, env);
                self.api.create(&env, &config).await
            }
        }
    }

    /// Pages through the remote listing for the resolved environment
    pub async fn list(
        &self,
        env: Option<&str>,
        page: Page,
    ) -> PortalResult<Vec<ServerConfigDTO>> {
        let env = self.settings.resolve_env(env)?;
        let listing = self.api.find_all(&env).await?;
        Ok(page.slice(listing))
    }
}
