//! Static route table.
//!
//! # Responsibilities
//! - Hold configured path → route payload mappings
//! - Answer lookups before any dynamic segmentation runs
//!
//! # Design Decisions
//! - Built once at startup, never mutated afterwards; shared via `Arc`
//!   and read concurrently without locks
//! - Literal paths are resolved through a `HashMap`; patterns are scanned
//!   in declaration order and the first match wins
//! - Literal entries take precedence over patterns

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RouteConfig;
use crate::routing::pattern::{PatternError, RoutePattern};
use crate::routing::route_data::RouteData;

#[derive(Debug)]
struct PatternEntry {
    pattern: RoutePattern,
    route: Arc<RouteConfig>,
}

/// Immutable lookup table for static routes.
#[derive(Debug, Default)]
pub struct StaticRouteTable {
    literals: HashMap<String, Arc<RouteConfig>>,
    patterns: Vec<PatternEntry>,
}

impl StaticRouteTable {
    /// An empty table; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the table from configured routes.
    ///
    /// A later literal entry for the same path replaces an earlier one;
    /// validation rejects such duplicates before this point.
    pub fn from_config(routes: &[RouteConfig]) -> Result<Self, PatternError> {
        let mut table = Self::default();
        for route in routes {
            let pattern = RoutePattern::parse(&route.path)?;
            let route = Arc::new(route.clone());
            if pattern.is_literal() {
                table.literals.insert(pattern.normalized(), route);
            } else {
                table.patterns.push(PatternEntry { pattern, route });
            }
        }

        tracing::debug!(
            literal_routes = table.literals.len(),
            pattern_routes = table.patterns.len(),
            "Static route table built"
        );
        Ok(table)
    }

    /// Look up already-normalized path segments.
    pub fn lookup(&self, segments: &[&str]) -> Option<RouteData> {
        let normalized = format!("/{}", segments.join("/"));
        if let Some(route) = self.literals.get(&normalized) {
            return Some(RouteData::from_static(route.clone(), &[], &[]));
        }

        self.patterns.iter().find_map(|entry| {
            let found = entry.pattern.matches(segments)?;
            Some(RouteData::from_static(entry.route.clone(), &found.captures, &found.rest))
        })
    }

    pub fn len(&self) -> usize {
        self.literals.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::route_data::ParamValue;

    fn route(path: &str, controller: &str, action: &str) -> RouteConfig {
        RouteConfig {
            path: path.into(),
            namespace: Vec::new(),
            controller: controller.into(),
            action: action.into(),
            parameters: Vec::new(),
            named_parameters: Default::default(),
        }
    }

    #[test]
    fn test_literal_lookup() {
        let table = StaticRouteTable::from_config(&[route("/about", "page", "about")]).unwrap();

        let found = table.lookup(&["about"]).unwrap();
        assert!(found.is_static_route());
        assert_eq!(found.controller_class_name(), Some("PageController"));
        assert!(table.lookup(&["contact"]).is_none());
        assert!(table.lookup(&[]).is_none());
    }

    #[test]
    fn test_root_literal() {
        let table = StaticRouteTable::from_config(&[route("/", "home", "index")]).unwrap();
        let found = table.lookup(&[]).unwrap();
        assert_eq!(found.method_name(), Some("indexAction"));
    }

    #[test]
    fn test_literal_beats_pattern() {
        let table = StaticRouteTable::from_config(&[
            route("/posts/{slug}", "post", "show"),
            route("/posts/latest", "post", "latest"),
        ])
        .unwrap();

        assert_eq!(table.lookup(&["posts", "latest"]).unwrap().method_name(), Some("latestAction"));

        let found = table.lookup(&["posts", "hello%21"]).unwrap();
        assert_eq!(found.method_name(), Some("showAction"));
        assert_eq!(found.named("slug").and_then(ParamValue::as_text), Some("hello!"));
    }

    #[test]
    fn test_patterns_first_match_wins() {
        let table = StaticRouteTable::from_config(&[
            route("/files/{*path}", "file", "download"),
            route("/files/{name}", "file", "show"),
        ])
        .unwrap();

        let found = table.lookup(&["files", "a%20b.txt"]).unwrap();
        assert_eq!(found.method_name(), Some("downloadAction"));
        assert_eq!(found.parameters(), ["a b.txt"]);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(StaticRouteTable::from_config(&[route("/{*a}/b", "x", "y")]).is_err());
    }
}
