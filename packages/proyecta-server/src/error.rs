use axum::Json;
use axum::extract::{FromRequest, FromRequestParts};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use proyecta_core::ErrorBody;
use sea_orm::DbErr;
use thiserror::Error;
use tracing::{error, warn};

pub(crate) const MSG_INVALID_CREDENTIALS: &str = "Credenciales inválidas";
pub(crate) const MSG_UNAUTHENTICATED: &str = "No autenticado o sesión inválida.";
pub(crate) const MSG_PENDING_ROLE: &str =
    "Tu cuenta está pendiente de asignación de rol por el administrador.";
pub(crate) const MSG_ACCOUNT_INACTIVE: &str =
    "Tu cuenta está inactiva. Contacta al administrador.";
pub(crate) const MSG_FORBIDDEN: &str = "Acceso no autorizado";
pub(crate) const MSG_INTERNAL: &str = "Error interno del servidor";

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("pending role assignment")]
    PendingRoleAssignment,
    #[error("account inactive")]
    AccountInactive,
    #[error("forbidden")]
    Forbidden,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("national id already registered")]
    DuplicateNationalId,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(#[from] DbErr),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::PendingRoleAssignment | AppError::AccountInactive | AppError::Forbidden => {
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateEmail | AppError::DuplicateNationalId | AppError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            AppError::Db(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) | AppError::Conflict(msg) => {
                msg.clone()
            }
            AppError::InvalidCredentials => MSG_INVALID_CREDENTIALS.to_string(),
            AppError::Unauthenticated => MSG_UNAUTHENTICATED.to_string(),
            AppError::PendingRoleAssignment => MSG_PENDING_ROLE.to_string(),
            AppError::AccountInactive => MSG_ACCOUNT_INACTIVE.to_string(),
            AppError::Forbidden => MSG_FORBIDDEN.to_string(),
            AppError::DuplicateEmail => "El correo ya está registrado.".to_string(),
            AppError::DuplicateNationalId => "La cédula ya está registrada.".to_string(),
            AppError::Db(_) | AppError::Internal(_) => MSG_INTERNAL.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "rejected request body");
        Self::Validation("Cuerpo de la solicitud inválido.".to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        warn!(error = %rejection.body_text(), "rejected query string");
        Self::Validation("Parámetros de consulta inválidos.".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        match &self {
            AppError::Db(err) => error!(error = %err, "database error"),
            AppError::Internal(msg) => error!(error = %msg, "internal error"),
            _ => {}
        }
        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// JSON extractor whose rejection answers with the usual `{"error": ...}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub(crate) struct AppJson<T>(pub(crate) T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub(crate) struct AppQuery<T>(pub(crate) T);
