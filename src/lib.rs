//! Path-based request dispatch library.
//!
//! Resolves URL paths into route descriptors and drives them through a
//! controller / action / view pipeline, escalating failures once to a
//! configurable error handler.

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::AppConfig;
pub use dispatch::{
    Controller, ControllerRegistry, Dispatcher, Rendered, RequestContext, RequestInfo,
};
pub use http::HttpServer;
pub use routing::{RouteData, Router};
