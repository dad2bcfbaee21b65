use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

/// Outcome of a failed access rule.
///
/// `NotVisible` hides the object entirely and must be reported as "not found";
/// `NotAuthorized` is only used when the viewer can already see the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Diagnostic)]
pub enum Denial {
    #[error("{resource} not found")]
    #[diagnostic(code(brewlog::access::not_visible))]
    NotVisible { resource: &'static str },

    #[error("access to {resource} is forbidden")]
    #[diagnostic(
        code(brewlog::access::not_authorized),
        help("Only the owning brewer (or the note author) may change this object")
    )]
    NotAuthorized { resource: &'static str },
}

impl Denial {
    pub fn resource(&self) -> &'static str {
        match self {
            Denial::NotVisible { resource } | Denial::NotAuthorized { resource } => resource,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Denial::NotVisible { .. } => StatusCode::NOT_FOUND,
            Denial::NotAuthorized { .. } => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denial_status_codes() {
        let hidden = Denial::NotVisible { resource: "brewery" };
        let forbidden = Denial::NotAuthorized { resource: "brewery" };
        assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_not_visible_message_does_not_leak_ownership() {
        let hidden = Denial::NotVisible { resource: "brew" };
        assert_eq!(hidden.to_string(), "brew not found");
        assert_eq!(hidden.resource(), "brew");
    }

    #[test]
    fn test_denial_into_response() {
        let response = Denial::NotAuthorized { resource: "tasting note" }.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
