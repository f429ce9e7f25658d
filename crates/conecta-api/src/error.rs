use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Channel not connected: {0}")]
    ChannelNotConnected(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Webhook verification failed")]
    VerificationFailed,

    #[error("Storage error: {0}")]
    Store(#[from] conecta_persist::StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::UnknownChannel(_) | ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::ChannelNotConnected(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::VerificationFailed => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::Store(ref e) => {
                tracing::error!("Storage error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
