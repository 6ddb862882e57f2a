//! Request path resolution.
//!
//! # Responsibilities
//! - Normalize a raw path into segments
//! - Consult the static route table first
//! - Otherwise walk segments into namespaces, controller, action and
//!   parameters
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Static routes short-circuit dynamic segmentation entirely
//! - The router never judges validity; an empty path yields an empty
//!   descriptor and the dispatcher reports the miss

use std::sync::Arc;

use crate::routing::namespace::{NamespaceRegistry, NamespaceSet};
use crate::routing::naming;
use crate::routing::route_data::RouteData;
use crate::routing::static_table::StaticRouteTable;

/// Resolves request paths into [`RouteData`].
#[derive(Clone)]
pub struct Router {
    static_routes: Arc<StaticRouteTable>,
    namespaces: Arc<dyn NamespaceRegistry>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("static_routes", &self.static_routes.len())
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Create a router over a static table and a namespace predicate.
    pub fn new(
        static_routes: Arc<StaticRouteTable>,
        namespaces: Arc<dyn NamespaceRegistry>,
    ) -> Self {
        Self {
            static_routes,
            namespaces,
        }
    }

    /// A router with no static routes and no namespaces.
    pub fn bare() -> Self {
        Self::new(Arc::new(StaticRouteTable::empty()), Arc::new(NamespaceSet::new()))
    }

    /// Resolve `path` into a route descriptor.
    pub fn resolve(&self, path: &str) -> RouteData {
        let segments = split_path(path);

        if let Some(route) = self.static_routes.lookup(&segments) {
            tracing::debug!(path = %path, url = %route.to_url(), "Static route matched");
            return route;
        }

        let route = self.segment(&segments);
        tracing::debug!(
            path = %path,
            controller = ?route.controller_class_name(),
            action = ?route.method_name(),
            "Dynamic route resolved"
        );
        route
    }

    fn segment(&self, segments: &[&str]) -> RouteData {
        let mut route = RouteData::new();
        let mut rest = segments.iter();

        // Leading namespaces, then the controller.
        let mut chain: Vec<String> = Vec::new();
        for segment in rest.by_ref() {
            chain.push(naming::namespace_identifier(segment));
            if self.namespaces.contains(&chain) {
                route.add_namespace(segment);
            } else {
                route.set_controller(segment);
                break;
            }
        }

        if route.controller_segment().is_some() {
            if let Some(segment) = rest.next() {
                route.set_method(segment);
            }
        }

        for segment in rest {
            match split_named(segment) {
                Some((key, value)) => route.add_named_parameter(key, value),
                None => route.add_parameter(segment),
            }
        }

        route
    }
}

/// Split on `/`, dropping empty tokens.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

// A raw `key:value` token: exactly one colon and a non-empty key.
fn split_named(segment: &str) -> Option<(&str, &str)> {
    let (key, value) = segment.split_once(':')?;
    if key.is_empty() || value.contains(':') {
        return None;
    }
    Some((key, value))
}
