//! Response handling.
//!
//! # Responsibilities
//! - Map a dispatch result to an HTTP response
//!
//! # Design Decisions
//! - The status hint decides the status code; an out-of-range hint
//!   becomes 500
//! - Bodies are sent as plain text; controllers that need another
//!   content type are outside this host's scope

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::dispatch::Rendered;

pub const X_DISPATCH_FAILURE: &str = "x-dispatch-failure";

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.body,
        )
            .into_response();

        if let Some(kind) = self.failure {
            response.headers_mut().insert(
                X_DISPATCH_FAILURE,
                header::HeaderValue::from_static(kind.action_name()),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::FailureKind;

    #[test]
    fn test_status_and_failure_header() {
        let rendered = Rendered {
            body: "gone".into(),
            status: 404,
            failure: Some(FailureKind::NoMatch),
            fallback: false,
        };
        let response = rendered.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[X_DISPATCH_FAILURE], "noMatch");
    }

    #[test]
    fn test_invalid_status_becomes_500() {
        let rendered = Rendered {
            body: String::new(),
            status: 42,
            failure: None,
            fallback: false,
        };
        assert_eq!(rendered.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
