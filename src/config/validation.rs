//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check static route patterns parse and do not collide
//! - Check the error handler location is usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::AppConfig;
use crate::routing::pattern::{PatternError, RoutePattern};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("route {index}: {source}")]
    Pattern {
        index: usize,
        #[source]
        source: PatternError,
    },
    #[error("route {index} ('{path}'): {field} must not be empty")]
    EmptyField {
        index: usize,
        path: String,
        field: &'static str,
    },
    #[error("route {index}: path '{path}' is already mapped")]
    DuplicatePath { index: usize, path: String },
    #[error("dispatch.error_controller must not be empty")]
    EmptyErrorController,
    #[error("namespace entry {0} is empty")]
    EmptyNamespace(usize),
    #[error("strip path '{0}' must be absolute")]
    RelativeStripPath(String),
    #[error("invalid log level '{0}'")]
    LogLevel(String),
}

/// Validate the whole configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, route) in config.routes.iter().enumerate() {
        match RoutePattern::parse(&route.path) {
            Ok(pattern) => {
                if !seen.insert(pattern.normalized()) {
                    errors.push(ValidationError::DuplicatePath {
                        index,
                        path: route.path.clone(),
                    });
                }
            }
            Err(source) => errors.push(ValidationError::Pattern { index, source }),
        }

        let fields = [("controller", &route.controller), ("action", &route.action)];
        for (field, value) in fields {
            if value.trim().is_empty() {
                errors.push(ValidationError::EmptyField {
                    index,
                    path: route.path.clone(),
                    field,
                });
            }
        }
        if route.namespace.iter().any(|s| s.trim().is_empty()) {
            errors.push(ValidationError::EmptyField {
                index,
                path: route.path.clone(),
                field: "namespace",
            });
        }
    }

    if config.dispatch.error_controller.trim().is_empty() {
        errors.push(ValidationError::EmptyErrorController);
    }

    for (index, ns) in config.namespaces.iter().enumerate() {
        if ns.split('/').all(|s| s.is_empty()) {
            errors.push(ValidationError::EmptyNamespace(index));
        }
    }

    for prefix in &config.dispatch.strip_paths {
        if !std::path::Path::new(prefix).is_absolute() {
            errors.push(ValidationError::RelativeStripPath(prefix.clone()));
        }
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
