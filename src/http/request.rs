//! Request handling.
//!
//! # Responsibilities
//! - Read the request ID set by the request-id layer
//! - Extract the caller identity from headers
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing; a missing or
//!   malformed ID gets a fresh UUID rather than failing the request
//! - Identity headers are trusted as-is; authentication happens upstream

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::dispatch::{Identity, RequestInfo};

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_USER_ID: &str = "x-user-id";
pub const X_USER_ROLES: &str = "x-user-roles";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Build the dispatcher's view of the request from its headers.
pub fn request_info(headers: &HeaderMap) -> RequestInfo {
    let request_id = header(headers, X_REQUEST_ID)
        .and_then(|v| Uuid::parse_str(v).ok())
        .unwrap_or_else(Uuid::new_v4);

    let identity = header(headers, X_USER_ID).map(|user| {
        let roles = header(headers, X_USER_ROLES)
            .map(|roles| {
                roles
                    .split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Identity {
            user: user.to_string(),
            roles,
        }
    });

    RequestInfo { request_id, identity }
}
