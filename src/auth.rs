//! Request identity and the super-admin guard
//!
//! Authentication itself happens upstream (gateway or SSO filter); this
//! service only reads the identity headers that layer forwards. A missing
//! user header still yields a usable identity for the unguarded routes,
//! falling back to the portal's conventional default user id.

use std::collections::BTreeSet;
use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};

use crate::errors::{PortalError, PortalResult};

/// Header carrying the caller's user id
pub const USER_HEADER: &str = "x-portal-user";
/// Header carrying a comma-separated role list
pub const ROLES_HEADER: &str = "x-portal-roles";
/// Role required by the guarded operations
pub const SUPER_ADMIN_ROLE: &str = "super-admin";
/// User id stamped when no identity header is present
pub const DEFAULT_USER: &str = "apollo";

/// An authenticated caller
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserInfo {
    pub user_id: String,
    roles: BTreeSet<String>,
}

impl UserInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_super_admin(&self) -> bool {
        self.has_role(SUPER_ADMIN_ROLE)
    }
}

/// Identity resolved from the request headers
#[derive(Clone, Debug, Default)]
pub struct RequestIdentity {
    user: Option<UserInfo>,
}

impl RequestIdentity {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user_id = headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let user = user_id.map(|id| {
            let mut user = UserInfo::new(id);
            if let Some(roles) = headers.get(ROLES_HEADER).and_then(|v| v.to_str().ok()) {
                for role in roles.split(',') {
                    let role = role.trim();
                    if !role.is_empty() {
                        user = user.with_role(role);
                    }
                }
            }
            user
        });

        Self { user }
    }

    /// User id to stamp into audit fields
    pub fn user_id(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.user_id.as_str())
            .unwrap_or(DEFAULT_USER)
    }

    /// Guard for the super-admin-only operations
    pub fn require_super_admin(&self) -> PortalResult<&UserInfo> {
        let user = self.user.as_ref().ok_or_else(|| {
            PortalError::Unauthorized("No authenticated user on request".to_string())
        })?;

        if !user.is_super_admin() {
            return Err(PortalError::Forbidden(format!(
                "User '{}' is not a super admin",
                user.user_id
            )));
        }

        Ok(user)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
