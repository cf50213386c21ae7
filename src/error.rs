use actix_web::{HttpResponse, ResponseError};

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Ledger database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for GateError {
    fn error_response(&self) -> HttpResponse {
        match self {
            GateError::Database(e) => {
                tracing::error!("database error: {}", e);
            }
            GateError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
            }
        }
        HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "internal_error",
            "message": "An internal error occurred"
        }))
    }
}
