//! Error types for the StatsGateway

use persistence::StoreError;
use serde::Serialize;
use stat_engine::StatsError;
use std::convert::Infallible;
use thiserror::Error;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

/// Errors that can occur while starting the StatsGateway
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type for StatsGateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Engine error carried through warp's rejection chain
#[derive(Debug)]
pub struct ApiError(pub StatsError);

impl warp::reject::Reject for ApiError {}

/// Turn an engine error into a rejection
pub fn reject(err: StatsError) -> Rejection {
    if err.is_client_error() {
        tracing::debug!("Request rejected: {}", err);
    }
    warp::reject::custom(ApiError(err))
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub timestamp: String,
}

/// Error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail { code: code.to_string(), message: message.into(), details: None },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// HTTP status of an engine error
pub fn status_for(err: &StatsError) -> StatusCode {
    match err {
        StatsError::InvalidField(_) | StatsError::InvalidScope(_) => StatusCode::BAD_REQUEST,
        StatsError::NotFound(_) => StatusCode::NOT_FOUND,
        StatsError::DuplicateEntity(_) => StatusCode::CONFLICT,
        StatsError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert any rejection into a JSON error body
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, body) = if let Some(ApiError(api_err)) = err.find::<ApiError>() {
        let mut body = ErrorResponse::new(api_err.code(), api_err.to_string());
        if let StatsError::InvalidField(field) = api_err {
            body.error.details = Some(serde_json::json!({ "field": field }));
        }
        (status_for(api_err), body)
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, ErrorResponse::new("ROUTE_NOT_FOUND", "No such endpoint"))
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, ErrorResponse::new("INVALID_BODY", e.to_string()))
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, ErrorResponse::new("INVALID_QUERY", e.to_string()))
    } else if let Some(e) = err.find::<warp::reject::UnsupportedMediaType>() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorResponse::new("UNSUPPORTED_MEDIA_TYPE", e.to_string()),
        )
    } else if let Some(e) = err.find::<warp::cors::CorsForbidden>() {
        (StatusCode::FORBIDDEN, ErrorResponse::new("CORS_FORBIDDEN", e.to_string()))
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorResponse::new("METHOD_NOT_ALLOWED", "Method not allowed"),
        )
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("INTERNAL_ERROR", "Internal server error"),
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}
