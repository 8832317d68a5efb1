//! Storage-side records used by the subscriber repository.
//!
//! Keep these structs focused on what is persisted. Request validation lives
//! in the service layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscriber row as persisted in the `subscribers` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscriber {
    pub id: i64,
    pub address: String,
    pub confirmed_at: DateTime<Utc>,
    pub opt_out: bool,
}

/// Zero-based page selector for listing subscribers by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub count: i64,
}

impl PageParams {
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.count)
    }
}
