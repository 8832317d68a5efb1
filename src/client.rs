//! Typed client for the mailing list RPC endpoints.

use crate::model::{
    CreateEmailRequest, DeleteEmailRequest, EmailEntry, EmailResponse, ErrorResponse,
    GetEmailBatchRequest, GetEmailBatchResponse, GetEmailRequest, UpdateEmailRequest,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{code} ({status}): {message}")]
    Remote {
        status: u16,
        code: String,
        message: String,
    },
}

impl ClientError {
    /// Machine-readable error code returned by the server, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Remote { code, .. } => Some(code),
            ClientError::Http(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailingListClient {
    http: Client,
    base_url: String,
}

impl MailingListClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    async fn call<Req, Resp>(&self, op: &str, req: &Req) -> Result<Resp, ClientError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/rpc/{}", self.base_url, op);
        debug!(%url, "rpc call");
        let resp = self.http.post(&url).json(req).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<Resp>().await?);
        }
        let text = resp.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => (body.code, body.error),
            Err(_) => ("UNKNOWN".to_string(), text),
        };
        Err(ClientError::Remote {
            status: status.as_u16(),
            code,
            message,
        })
    }

    pub async fn get_email(&self, address: &str) -> Result<Option<EmailEntry>, ClientError> {
        let req = GetEmailRequest {
            email_addr: address.to_string(),
        };
        let resp: EmailResponse = self.call("GetEmail", &req).await?;
        Ok(resp.email_entry)
    }

    pub async fn get_email_batch(
        &self,
        page: i32,
        count: i32,
    ) -> Result<Vec<EmailEntry>, ClientError> {
        let req = GetEmailBatchRequest { page, count };
        let resp: GetEmailBatchResponse = self.call("GetEmailBatch", &req).await?;
        Ok(resp.email_entries)
    }

    pub async fn create_email(&self, address: &str) -> Result<Option<EmailEntry>, ClientError> {
        let req = CreateEmailRequest {
            email_addr: address.to_string(),
        };
        let resp: EmailResponse = self.call("CreateEmail", &req).await?;
        Ok(resp.email_entry)
    }

    pub async fn update_email(&self, entry: EmailEntry) -> Result<Option<EmailEntry>, ClientError> {
        let req = UpdateEmailRequest { email_entry: entry };
        let resp: EmailResponse = self.call("UpdateEmail", &req).await?;
        Ok(resp.email_entry)
    }

    pub async fn delete_email(&self, address: &str) -> Result<Option<EmailEntry>, ClientError> {
        let req = DeleteEmailRequest {
            email_addr: address.to_string(),
        };
        let resp: EmailResponse = self.call("DeleteEmail", &req).await?;
        Ok(resp.email_entry)
    }
}
