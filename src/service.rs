//! Service boundary for the five remote operations.
//!
//! Each call validates its request, runs exactly one store operation (plus the
//! read-back lookup for mutating calls) and translates the result into wire
//! records. A missing subscriber is an empty response, never an error.

use crate::db::{PageParams, StoreError, SubscriberStore};
use crate::model::{
    CreateEmailRequest, DeleteEmailRequest, EmailResponse, GetEmailBatchRequest,
    GetEmailBatchResponse, GetEmailRequest, UpdateEmailRequest,
};
use crate::translate::{to_storage, to_wire};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

/// Largest page a caller may request in one `GetEmailBatch` call.
pub const MAX_PAGE_SIZE: i32 = 1000;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Clone)]
pub struct MailingList {
    store: Arc<dyn SubscriberStore>,
}

impl MailingList {
    pub fn new(store: Arc<dyn SubscriberStore>) -> Self {
        Self { store }
    }

    async fn email_response(&self, address: &str) -> ServiceResult<EmailResponse> {
        let found = self.store.get_by_address(address).await?;
        Ok(match found {
            Some(sub) => EmailResponse::with_entry(to_wire(&sub)),
            None => EmailResponse::empty(),
        })
    }

    #[instrument(skip_all)]
    pub async fn get_email(&self, req: GetEmailRequest) -> ServiceResult<EmailResponse> {
        info!(?req, "GetEmail");
        let address = validate_address(&req.email_addr)?;
        self.email_response(address).await
    }

    #[instrument(skip_all)]
    pub async fn get_email_batch(
        &self,
        req: GetEmailBatchRequest,
    ) -> ServiceResult<GetEmailBatchResponse> {
        info!(?req, "GetEmailBatch");
        let params = validate_page(&req)?;
        let subs = self.store.get_page(params).await?;
        Ok(GetEmailBatchResponse {
            email_entries: subs.iter().map(to_wire).collect(),
        })
    }

    #[instrument(skip_all)]
    pub async fn create_email(&self, req: CreateEmailRequest) -> ServiceResult<EmailResponse> {
        info!(?req, "CreateEmail");
        let address = validate_address(&req.email_addr)?;
        self.store.create(address).await?;
        self.email_response(address).await
    }

    #[instrument(skip_all)]
    pub async fn update_email(&self, req: UpdateEmailRequest) -> ServiceResult<EmailResponse> {
        info!(?req, "UpdateEmail");
        validate_epoch(req.email_entry.confirmed_at)?;
        let mut sub = to_storage(&req.email_entry);
        sub.address = validate_address(&sub.address)?.to_string();
        self.store.update(&sub).await?;
        self.email_response(&sub.address).await
    }

    #[instrument(skip_all)]
    pub async fn delete_email(&self, req: DeleteEmailRequest) -> ServiceResult<EmailResponse> {
        info!(?req, "DeleteEmail");
        let address = validate_address(&req.email_addr)?;
        self.store.delete(address).await?;
        self.email_response(address).await
    }
}

fn validate_address(raw: &str) -> ServiceResult<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidArgument(
            "email address must be non-empty".into(),
        ));
    }
    Ok(trimmed)
}

fn validate_epoch(secs: i64) -> ServiceResult<()> {
    if DateTime::<Utc>::from_timestamp(secs, 0).is_none() {
        return Err(ServiceError::InvalidArgument(format!(
            "confirmed_at {secs} is outside the representable time range"
        )));
    }
    Ok(())
}

fn validate_page(req: &GetEmailBatchRequest) -> ServiceResult<PageParams> {
    if req.page < 0 {
        return Err(ServiceError::InvalidArgument(format!(
            "page must be >= 0, got {}",
            req.page
        )));
    }
    if req.count <= 0 || req.count > MAX_PAGE_SIZE {
        return Err(ServiceError::InvalidArgument(format!(
            "count must be in 1..={MAX_PAGE_SIZE}, got {}",
            req.count
        )));
    }
    Ok(PageParams {
        page: i64::from(req.page),
        count: i64::from(req.count),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_trimmed() {
        assert_eq!(validate_address("  a@example.com \n").unwrap(), "a@example.com");
    }

    #[test]
    fn blank_address_rejected() {
        let err = validate_address(" \t ").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[test]
    fn epoch_range() {
        validate_epoch(0).unwrap();
        validate_epoch(-86_400).unwrap();
        validate_epoch(253_402_300_799).unwrap();

        for secs in [i64::MAX, i64::MIN] {
            let err = validate_epoch(secs).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidArgument(_)), "secs={secs}");
        }
    }

    #[test]
    fn page_bounds() {
        let ok = validate_page(&GetEmailBatchRequest { page: 0, count: 2 }).unwrap();
        assert_eq!(ok, PageParams { page: 0, count: 2 });

        for (page, count) in [(-1, 2), (0, 0), (0, -5), (1, MAX_PAGE_SIZE + 1)] {
            let err = validate_page(&GetEmailBatchRequest { page, count }).unwrap_err();
            assert!(
                matches!(err, ServiceError::InvalidArgument(_)),
                "page={page} count={count}"
            );
        }
    }
}
