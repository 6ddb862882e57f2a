//! HTTP host subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID / trace / timeout layers)
//!     → request.rs (request ID, identity headers → RequestInfo)
//!     → routing::Router::resolve → dispatch::Dispatcher::dispatch
//!     → response.rs (Rendered → status + body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_info, X_REQUEST_ID};
pub use server::HttpServer;
