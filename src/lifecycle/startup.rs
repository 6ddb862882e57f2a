//! Startup sequence.
//!
//! # Responsibilities
//! - Build the static route table from validated configuration
//! - Merge registry and configured namespaces into the router predicate
//! - Assemble templates and the dispatcher
//!
//! # Design Decisions
//! - Everything built here is immutable afterwards and shared via `Arc`
//! - Application controllers are registered by the caller before `build`;
//!   bundled controllers only fill names left free

use std::sync::Arc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::dispatch::{ControllerRegistry, Dispatcher, IdentityPolicy};
use crate::handlers;
use crate::routing::pattern::PatternError;
use crate::routing::{Router, StaticRouteTable};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("static route table: {0}")]
    StaticRoutes(#[from] PatternError),
}

/// The request-serving core, ready to share across workers.
#[derive(Debug, Clone)]
pub struct Components {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
}

/// Build router and dispatcher from configuration and a populated registry.
pub fn build(
    config: &AppConfig,
    mut registry: ControllerRegistry,
) -> Result<Components, StartupError> {
    handlers::register_defaults(&mut registry, &config.dispatch);

    let table = StaticRouteTable::from_config(&config.routes)?;

    let mut namespaces = registry.namespaces().clone();
    for path in &config.namespaces {
        namespaces.insert_path(path);
    }

    let mut templates = handlers::default_templates();
    for (id, source) in &config.templates {
        templates.insert(id.clone(), source.clone());
    }

    tracing::info!(
        controllers = registry.len(),
        static_routes = table.len(),
        namespaces = namespaces.len(),
        templates = templates.len(),
        "Dispatch core ready"
    );

    let router = Router::new(Arc::new(table), Arc::new(namespaces));
    let dispatcher =
        Dispatcher::new(Arc::new(registry), Arc::new(templates), Arc::new(IdentityPolicy))
            .configure(&config.dispatch);

    Ok(Components {
        router: Arc::new(router),
        dispatcher: Arc::new(dispatcher),
    })
}
