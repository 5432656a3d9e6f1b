// ============================================================================
// ERREURS APPLICATIVES
// ============================================================================
//
// Description:
//   Taxonomie unique des erreurs renvoyées par les services et les routes.
//   Chaque variante correspond à un code HTTP et à un code machine stable.
//
// Format de réponse:
//   { "code": "VALIDATION", "error": "complete all questionnaire fields." }
//
// Points d'attention:
//   - Les erreurs INTERNAL sont loggées puis masquées (message opaque)
//   - Une violation de contrainte UNIQUE côté BD devient CONFLICT
//
// ============================================================================

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::services::verification_store::VerificationStoreError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Entrée mal formée ou incomplète, corrigeable par l'appelant
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Doublon sur un champ unique (email alternatif, email de compte)
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    SizeLimit(String),

    /// L'email n'a pas pu partir (le code reste valide)
    #[error("{0}")]
    Delivery(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::SizeLimit(_) => "SIZE_LIMIT",
            AppError::Delivery(_) => "DELIVERY_ERROR",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                AppError::Conflict(format!("Resource already exists: {}", detail))
            }
            _ => AppError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<VerificationStoreError> for AppError {
    fn from(err: VerificationStoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::SizeLimit(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Delivery(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "code": self.code(),
            "error": message
        }))
    }
}
