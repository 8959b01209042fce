//! Offset pagination over a conversation, newest page first.

use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A validated page window.
///
/// Page 1 is the most recent window of a conversation; higher pages walk
/// backwards in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Build a page request, rejecting non-positive values.
    pub fn new(page: i64, page_size: i64) -> Result<Self, AppError> {
        if page < 1 {
            return Err(AppError::Validation(format!(
                "page must be a positive integer, got {}",
                page
            )));
        }
        if page_size < 1 {
            return Err(AppError::Validation(format!(
                "limit must be a positive integer, got {}",
                page_size
            )));
        }
        let page = u32::try_from(page)
            .map_err(|_| AppError::Validation("page is out of range".into()))?;
        let page_size = u32::try_from(page_size)
            .map_err(|_| AppError::Validation("limit is out of range".into()))?;

        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of newer messages skipped before this window starts.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    /// Whether messages older than this window exist in a conversation of `total`.
    pub fn has_more(&self, total: i64) -> bool {
        total > self.offset() + i64::from(self.page_size)
    }
}
