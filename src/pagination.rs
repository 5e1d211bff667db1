//! Page-window parameters shared by the list endpoints
//!
//! `offset` is a 1-based page number, kept from the portal's existing API
//! contract: page N covers items `[(N-1)*limit, N*limit)`. Bounds are
//! validated up front and violations surface as a typed validation error;
//! a valid page past the end of the data is an empty list, not an error.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::{PortalError, PortalResult};

/// Largest allowed page size
pub const MAX_LIMIT: i64 = 500;

/// Raw `offset`/`limit` query parameters
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number
    #[serde(default = "default_offset")]
    pub offset: i64,
    /// Page size
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_offset() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            offset: default_offset(),
            limit: default_limit(),
        }
    }
}

impl PageQuery {
    /// Validates the raw parameters into a usable page window
    pub fn validate(self) -> PortalResult<Page> {
        if self.offset < 1 {
            return Err(PortalError::Validation(format!(
                "offset must be a positive page number, got {}",
                self.offset
            )));
        }
        if self.limit < 1 {
            return Err(PortalError::Validation(format!(
                "limit must be positive, got {}",
                self.limit
            )));
        }
        if self.limit > MAX_LIMIT {
            return Err(PortalError::Validation(format!(
                "limit must not exceed {}, got {}",
                MAX_LIMIT, self.limit
            )));
        }
        Ok(Page {
            offset: self.offset as u64,
            limit: self.limit as u64,
        })
    }
}

/// A validated page window
#[derive(Debug, Clone, Copy)]
pub struct Page {
    offset: u64,
    limit: u64,
}

impl Page {
    /// Cuts the page window out of a fully materialized listing
    pub fn slice<T>(self, items: Vec<T>) -> Vec<T> {
        let len = items.len() as u64;
        // offset is >= 1 after validation; a window past the end is empty
        let start = match (self.offset - 1).checked_mul(self.limit) {
            Some(start) if start < len => start,
            _ => return Vec::new(),
        };
        let end = start.saturating_add(self.limit).min(len);

        items
            .into_iter()
            .skip(start as usize)
            .take((end - start) as usize)
            .collect()
    }
}
