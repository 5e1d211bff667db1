//! Create-or-update and lookup logic for the local server-config table

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::database::entities::{server_configs, server_configs::Entity as ServerConfigs};
use crate::errors::{PortalError, PortalResult};
use crate::pagination::Page;

pub const MAX_KEY_LEN: usize = 128;
pub const MAX_VALUE_LEN: usize = 2048;
pub const MAX_COMMENT_LEN: usize = 1024;

/// An incoming server-config write (create or update decided by key lookup)
#[derive(Clone, Debug)]
pub struct ServerConfigWrite {
    pub key: String,
    pub value: String,
    pub comment: Option<String>,
}

impl ServerConfigWrite {
    pub fn validate(&self) -> PortalResult<()> {
        if self.key.trim().is_empty() {
            return Err(PortalError::Validation("key must not be blank".to_string()));
        }
        if self.key.len() > MAX_KEY_LEN {
            return Err(PortalError::Validation(format!(
                "key must not exceed {} characters",
                MAX_KEY_LEN
            )));
        }
        if self.value.len() > MAX_VALUE_LEN {
            return Err(PortalError::Validation(format!(
                "value must not exceed {} characters",
                MAX_VALUE_LEN
            )));
        }
        if let Some(comment) = &self.comment {
            if comment.len() > MAX_COMMENT_LEN {
                return Err(PortalError::Validation(format!(
                    "comment must not exceed {} characters",
                    MAX_COMMENT_LEN
                )));
            }
        }
        Ok(())
    }
}

pub struct ServerConfigService {
    db: DatabaseConnection,
}

impl ServerConfigService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_key(&self, key: &str) -> PortalResult<Option<server_configs::Model>> {
        let config = ServerConfigs::find()
            .filter(server_configs::Column::Key.eq(key))
            .one(&self.db)
            .await?;
        Ok(config)
    }

    /// Lookup that treats a missing key as an explicit not-found error
    pub async fn get_by_key(&self, key: &str) -> PortalResult<server_configs::Model> {
        self.find_by_key(key).await?.ok_or(PortalError::NotFound {
            entity: "ServerConfig",
            id: key.to_string(),
        })
    }

    pub async fn find_all(&self) -> PortalResult<Vec<server_configs::Model>> {
        let configs = ServerConfigs::find()
            .order_by_asc(server_configs::Column::Id)
            .all(&self.db)
            .await?;
        Ok(configs)
    }

    /// Full materialization then an in-memory window; the table is a small
    /// administrator-only set.
    pub async fn list(&self, page: Page) -> PortalResult<Vec<server_configs::Model>> {
        let configs = self.find_all().await?;
        Ok(page.slice(configs))
    }

    /// Creates the config on first write to a key, merges onto the stored
    /// row on subsequent writes. Returns the persisted row.
    pub async fn save(
        &self,
        write: ServerConfigWrite,
        modified_by: &str,
    ) -> PortalResult<server_configs::Model> {
        write.validate()?;
        let now = Utc::now();

        let persisted = match self.find_by_key(&write.key).await? {
            None => {
                let config = server_configs::ActiveModel {
                    key: Set(write.key),
                    value: Set(write.value),
                    comment: Set(write.comment),
                    created_by: Set(modified_by.to_string()),
                    last_modified_by: Set(modified_by.to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                config.insert(&self.db).await?
            }
            Some(stored) => {
                let merged = merge_write(stored, write, modified_by, now);
                merged.update(&self.db).await?
            }
        };

        Ok(persisted)
    }
}

/// Explicit field-by-field merge of an incoming write onto a stored row.
///
/// Preserves `id`, `key`, `created_by` and `created_at`; takes `value` and
/// `comment` from the write and stamps the modifier and update time.
fn merge_write(
    stored: server_configs::Model,
    write: ServerConfigWrite,
    modified_by: &str,
    now: DateTime<Utc>,
) -> server_configs::ActiveModel {
    let mut merged: server_configs::ActiveModel = stored.into();
    merged.value = Set(write.value);
    merged.comment = Set(write.comment);
    merged.last_modified_by = Set(modified_by.to_string());
    merged.updated_at = Set(now);
    merged
}
