use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use sqlx::migrate::MigrateError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BootError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Configuration extraction error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrateError),

    #[error("Database not ready after {attempts} attempts: {last_error}")]
    ReadinessTimeout { attempts: usize, last_error: String },

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blocking task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl From<figment::Error> for BootError {
    fn from(e: figment::Error) -> Self {
        BootError::Figment(Box::new(e))
    }
}

impl IntoResponse for BootError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            BootError::DatabaseError(_) | BootError::ReadinessTimeout { .. } => {
                let status = StatusCode::SERVICE_UNAVAILABLE;
                let body = ApiErrorBody {
                    code: "STORE_UNAVAILABLE".to_string(),
                    message: "The persistent store is unavailable.".to_string(),
                };
                (status, body)
            }
            _ => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (status, body)
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
