//! JSON-over-HTTP transport for the mailing list operations.
//!
//! Every remote procedure is a `POST /rpc/<Operation>` taking and returning a
//! JSON record from [`crate::model`].

use crate::db::StoreError;
use crate::model::{
    CreateEmailRequest, DeleteEmailRequest, EmailResponse, ErrorResponse, GetEmailBatchRequest,
    GetEmailBatchResponse, GetEmailRequest, UpdateEmailRequest,
};
use crate::service::{MailingList, ServiceError};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServiceError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            ServiceError::Store(StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ServiceError::Store(StoreError::UniquenessViolation(_)) => {
                (StatusCode::CONFLICT, "ALREADY_EXISTS")
            }
            ServiceError::Store(StoreError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
        };

        if status.is_server_error() {
            error!(err = %self, "operation failed");
        } else {
            warn!(err = %self, "operation rejected");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(service: MailingList) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/rpc/GetEmail", post(get_email))
        .route("/rpc/GetEmailBatch", post(get_email_batch))
        .route("/rpc/CreateEmail", post(create_email))
        .route("/rpc/UpdateEmail", post(update_email))
        .route("/rpc/DeleteEmail", post(delete_email))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_email(
    State(svc): State<MailingList>,
    Json(req): Json<GetEmailRequest>,
) -> Result<Json<EmailResponse>, ServiceError> {
    Ok(Json(svc.get_email(req).await?))
}

async fn get_email_batch(
    State(svc): State<MailingList>,
    Json(req): Json<GetEmailBatchRequest>,
) -> Result<Json<GetEmailBatchResponse>, ServiceError> {
    Ok(Json(svc.get_email_batch(req).await?))
}

async fn create_email(
    State(svc): State<MailingList>,
    Json(req): Json<CreateEmailRequest>,
) -> Result<Json<EmailResponse>, ServiceError> {
    Ok(Json(svc.create_email(req).await?))
}

async fn update_email(
    State(svc): State<MailingList>,
    Json(req): Json<UpdateEmailRequest>,
) -> Result<Json<EmailResponse>, ServiceError> {
    Ok(Json(svc.update_email(req).await?))
}

async fn delete_email(
    State(svc): State<MailingList>,
    Json(req): Json<DeleteEmailRequest>,
) -> Result<Json<EmailResponse>, ServiceError> {
    Ok(Json(svc.delete_email(req).await?))
}
