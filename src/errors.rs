use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

use crate::access::Denial;

#[derive(Debug, Error, Diagnostic)]
pub enum JournalError {
    #[error("Database error: {0}")]
    #[diagnostic(code(brewlog::db))]
    Db(#[from] sea_orm::DbErr),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Denied(#[from] Denial),

    #[error("{0} not found")]
    #[diagnostic(code(brewlog::not_found))]
    NotFound(&'static str),

    #[error("Sign in to continue")]
    #[diagnostic(code(brewlog::unauthenticated))]
    Unauthenticated,

    #[error("Invalid input: {0}")]
    #[diagnostic(code(brewlog::validation))]
    Validation(String),
}

impl JournalError {
    pub fn status(&self) -> StatusCode {
        match self {
            JournalError::Denied(denial) => denial.status(),
            JournalError::NotFound(_) => StatusCode::NOT_FOUND,
            JournalError::Unauthenticated => StatusCode::UNAUTHORIZED,
            JournalError::Validation(_) => StatusCode::BAD_REQUEST,
            JournalError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for JournalError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "journal request failed");
            "internal error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denial_keeps_its_status() {
        let err = JournalError::from(Denial::NotVisible { resource: "brew" });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "brew not found");

        let err = JournalError::from(Denial::NotAuthorized { resource: "brew" });
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_missing_row_looks_like_hidden_row() {
        assert_eq!(
            JournalError::NotFound("brew").to_string(),
            Denial::NotVisible { resource: "brew" }.to_string()
        );
    }

    #[test]
    fn test_server_errors_are_not_echoed() {
        let response = JournalError::Db(sea_orm::DbErr::Custom("secret detail".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            JournalError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
