//! Portal settings loaded from a TOML file
//!
//! The portal needs to know which deployment environments it manages and
//! where each environment's admin service lives. Both come from a single
//! settings file; the first entry of `active_environments` is the default
//! target for remote-facing operations.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{PortalError, PortalResult};

/// Top-level settings file structure
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub server: ServerOptions,
    pub portal: PortalSettings,
    pub admin_service: AdminServiceOptions,
}

/// HTTP server options
#[derive(Debug, Clone, Deserialize)]
pub struct ServerOptions {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub cors_origin: Option<String>,
}

/// Ordered list of environments the portal currently manages
#[derive(Debug, Clone, Deserialize)]
pub struct PortalSettings {
    #[serde(default)]
    pub active_environments: Vec<String>,
}

/// Where to reach the admin service for each environment
#[derive(Debug, Clone, Deserialize)]
pub struct AdminServiceOptions {
    pub endpoints: HashMap<String, String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    8070
}

fn default_database() -> String {
    "portal.db".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            port: default_port(),
            database: default_database(),
            cors_origin: None,
        }
    }
}

impl PortalConfig {
    /// Loads and validates the settings file
    pub fn load<P: AsRef<Path>>(path: P) -> PortalResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PortalError::Config(format!(
                "Failed to read settings file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&contents)
            .map_err(|e| PortalError::Config(format!("Failed to parse settings file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Every active environment must have an admin-service endpoint
    fn validate(&self) -> PortalResult<()> {
        for env in &self.portal.active_environments {
            if !self.admin_service.endpoints.contains_key(env) {
                return Err(PortalError::Config(format!(
                    "Active environment '{}' has no admin_service endpoint",
                    env
                )));
            }
        }
        Ok(())
    }
}

impl PortalSettings {
    /// First active environment, the default target for remote operations
    pub fn default_env(&self) -> PortalResult<&str> {
        self.active_environments
            .first()
            .map(String::as_str)
            .ok_or(PortalError::NoActiveEnvironment)
    }

    /// Resolves an optional caller-supplied environment parameter.
    ///
    /// A named environment must be active; no parameter falls back to the
    /// first active environment.
    pub fn resolve_env(&self, requested: Option<&str>) -> PortalResult<String> {
        match requested {
            Some(env) => {
                if self.active_environments.iter().any(|e| e == env) {
                    Ok(env.to_string())
                } else {
                    Err(PortalError::Validation(format!(
                        "Environment '{}' is not an active environment",
                        env
                    )))
                }
            }
            None => self.default_env().map(str::to_string),
        }
    }
}

impl AdminServiceOptions {
    pub fn endpoint(&self, env: &str) -> PortalResult<&str> {
        self.endpoints
            .get(env)
            .map(String::as_str)
            .ok_or_else(|| {
                PortalError::Config(format!("No admin_service endpoint for environment '{}'", env))
            })
    }
}
