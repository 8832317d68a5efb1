//! Wire records exchanged across the remote procedure interface.

use serde::{Deserialize, Serialize};

/// Subscriber entry as seen by remote callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailEntry {
    pub id: i64,
    pub email: String,
    /// Seconds since the Unix epoch.
    pub confirmed_at: i64,
    pub opt_out: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetEmailRequest {
    pub email_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetEmailBatchRequest {
    pub page: i32,
    pub count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateEmailRequest {
    pub email_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateEmailRequest {
    pub email_entry: EmailEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteEmailRequest {
    pub email_addr: String,
}

/// Single-entry response. `email_entry` is `None` when no subscriber matches;
/// absence is a successful, empty answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailResponse {
    #[serde(default)]
    pub email_entry: Option<EmailEntry>,
}

impl EmailResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_entry(entry: EmailEntry) -> Self {
        Self {
            email_entry: Some(entry),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetEmailBatchResponse {
    #[serde(default)]
    pub email_entries: Vec<EmailEntry>,
}

/// Error body returned for failed operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
