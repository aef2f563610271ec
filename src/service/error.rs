use axum::http::StatusCode;
use thiserror::Error;

use crate::{error::HttpError, models::callmodel::CallStatus};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Call {call_id} cannot move to {requested} while {current}")]
    InvalidCallState {
        call_id: String,
        current: CallStatus,
        requested: CallStatus,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,

            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::InvalidCallState { .. }
            | ServiceError::Conflict(_) => StatusCode::CONFLICT,

            ServiceError::Config(_)
            | ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match &error {
            ServiceError::Database(e) => {
                tracing::error!("Database error: {}", e);
                HttpError::server_error("Internal server error")
            }
            ServiceError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                HttpError::server_error(error.to_string())
            }
            _ => HttpError::new(error.to_string(), error.status_code()),
        }
    }
}
