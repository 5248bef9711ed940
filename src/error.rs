use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required request parameter is missing.
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// No record matches the presented token.
    #[error("Token not found")]
    NotFound,

    /// The token's record is past its validity window.
    #[error("Download link expired after {hours} hours")]
    Expired {
        /// The configured validity window, in hours.
        hours: i64,
    },

    /// The HTTP method is not allowed on this route.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// A Sheets API error.
    #[error("Sheets API error: {0}")]
    Sheets(String),

    /// An HTTP client error.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A JWT signing error.
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// An SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// An email construction error.
    #[error("Mail error: {0}")]
    Mail(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::MissingParameter(ref name) => {
                tracing::debug!("Missing parameter: {}", name);
                (
                    StatusCode::BAD_REQUEST,
                    format!("Missing required parameter: {}", name),
                )
            }

            AppError::NotFound => {
                tracing::debug!("Token not found");
                (StatusCode::NOT_FOUND, "Download link not found".to_string())
            }

            AppError::Expired { hours } => {
                tracing::debug!("Token expired (window: {}h)", hours);
                (
                    StatusCode::FORBIDDEN,
                    format!(
                        "This download link has expired. Links are valid for {} hours after the request.",
                        hours
                    ),
                )
            }

            AppError::MethodNotAllowed => {
                tracing::debug!("Method not allowed");
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
            }

            AppError::Sheets(ref e) => {
                tracing::error!("Sheets API error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::Http(ref e) => {
                tracing::error!("HTTP client error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::Jwt(ref e) => {
                tracing::error!("JWT signing error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::Smtp(ref e) => {
                tracing::error!("SMTP transport error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::Mail(ref e) => {
                tracing::error!("Mail construction error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, body).into_response()
    }
}
