//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Resolve every request path and hand it to the dispatcher
//!
//! # Design Decisions
//! - Dispatch is synchronous and runs on the blocking pool, so the timeout
//!   layer can bound it without stalling the reactor
//! - The router and dispatcher are shared read-only across requests

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::dispatch::Dispatcher;
use crate::http::request::request_info;
use crate::lifecycle::Components;
use crate::routing::Router as PathRouter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<PathRouter>,
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP front for the dispatcher.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server over an assembled core.
    pub fn new(config: AppConfig, core: Components) -> Self {
        let state = AppState {
            router: core.router,
            dispatcher: core.dispatcher,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The Axum router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Resolve the path, dispatch, and answer with the rendered result.
async fn dispatch_handler(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    let info = request_info(&headers);
    let route = state.router.resolve(uri.path());

    tracing::debug!(
        request_id = %info.request_id,
        path = %uri.path(),
        static_route = route.is_static_route(),
        "Dispatching request"
    );

    let dispatcher = state.dispatcher.clone();
    match tokio::task::spawn_blocking(move || dispatcher.dispatch(&route, &info)).await {
        Ok(rendered) => rendered.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Dispatch task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
