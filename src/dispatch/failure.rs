//! Failure taxonomy for the dispatch pipeline.
//!
//! Every stage failure is a [`DispatchFailure`] tagged with a
//! [`FailureKind`]. The kind picks the error-handler action and the status
//! hint; the stage records where the failure was raised.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::dispatch::controller::HandlerError;

/// What went wrong while dispatching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NoMatch,
    NoFile,
    NoClass,
    NoMethod,
    NoView,
    NotAuthenticated,
    NotAuthorized,
    Uncaught,
    Generic,
}

impl FailureKind {
    pub const ALL: [FailureKind; 9] = [
        FailureKind::NoMatch,
        FailureKind::NoFile,
        FailureKind::NoClass,
        FailureKind::NoMethod,
        FailureKind::NoView,
        FailureKind::NotAuthenticated,
        FailureKind::NotAuthorized,
        FailureKind::Uncaught,
        FailureKind::Generic,
    ];

    /// Name of the error-handler action for this kind, e.g. `noMatch`.
    pub fn action_name(self) -> &'static str {
        match self {
            FailureKind::NoMatch => "noMatch",
            FailureKind::NoFile => "noFile",
            FailureKind::NoClass => "noClass",
            FailureKind::NoMethod => "noMethod",
            FailureKind::NoView => "noView",
            FailureKind::NotAuthenticated => "notAuthenticated",
            FailureKind::NotAuthorized => "notAuthorized",
            FailureKind::Uncaught => "uncaught",
            FailureKind::Generic => "generic",
        }
    }

    /// Path segment that resolves to [`action_name`](Self::action_name).
    pub fn action_segment(self) -> &'static str {
        match self {
            FailureKind::NoMatch => "no-match",
            FailureKind::NoFile => "no-file",
            FailureKind::NoClass => "no-class",
            FailureKind::NoMethod => "no-method",
            FailureKind::NoView => "no-view",
            FailureKind::NotAuthenticated => "not-authenticated",
            FailureKind::NotAuthorized => "not-authorized",
            FailureKind::Uncaught => "uncaught",
            FailureKind::Generic => "generic",
        }
    }

    /// HTTP status the host should answer with.
    pub fn status_code(self) -> u16 {
        match self {
            FailureKind::NoMatch
            | FailureKind::NoFile
            | FailureKind::NoClass
            | FailureKind::NoMethod => 404,
            FailureKind::NotAuthenticated => 401,
            FailureKind::NotAuthorized => 403,
            FailureKind::NoView | FailureKind::Uncaught | FailureKind::Generic => 500,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action_name())
    }
}

/// Pipeline stage a failure was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Matching,
    Loading,
    Instantiating,
    AuthChecking,
    Initializing,
    Invoking,
    ViewResolving,
    External,
}

impl Stage {
    /// Tag handed to the error handler as the `source` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Matching => "match",
            Stage::Loading => "load",
            Stage::Instantiating => "instantiate",
            Stage::AuthChecking => "auth",
            Stage::Initializing => "initialize",
            Stage::Invoking => "action",
            Stage::ViewResolving => "view",
            Stage::External => "external",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed stage, ready to be escalated.
#[derive(Debug, Clone, Error)]
#[error("{kind} at {stage}: {message}")]
pub struct DispatchFailure {
    pub kind: FailureKind,
    pub stage: Stage,
    pub message: String,
    /// The failure object for `Uncaught`.
    pub error: Option<Arc<HandlerError>>,
}

impl DispatchFailure {
    pub fn new(kind: FailureKind, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage,
            message: message.into(),
            error: None,
        }
    }

    /// Failure raised by controller or view code.
    pub fn uncaught(stage: Stage, error: HandlerError) -> Self {
        Self {
            kind: FailureKind::Uncaught,
            stage,
            message: error.to_string(),
            error: Some(Arc::new(error)),
        }
    }

    /// Externally detected configuration error.
    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Generic, Stage::External, message)
    }
}

/// Removes install paths from diagnostic text.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    prefixes: Vec<String>,
}

impl Sanitizer {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut prefixes: Vec<String> = prefixes
            .into_iter()
            .map(|p| p.into().trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        // Longest first so nested roots are stripped whole.
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()));
        Self { prefixes }
    }

    pub fn scrub(&self, text: &str) -> String {
        let mut out = text.to_string();
        for prefix in &self.prefixes {
            out = strip_root(&out, prefix);
        }
        out
    }
}

// Remove `root` wherever it ends at a path boundary, along with one trailing `/`.
fn strip_root(text: &str, root: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(root) {
        let after = &rest[pos + root.len()..];
        match after.chars().next() {
            Some('/') => {
                out.push_str(&rest[..pos]);
                rest = &after[1..];
            }
            // `/srv/app` inside `/srv/application`
            Some(c) if is_path_char(c) => {
                out.push_str(&rest[..pos + root.len()]);
                rest = after;
            }
            _ => {
                out.push_str(&rest[..pos]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::naming;

    #[test]
    fn test_action_segments_resolve_to_action_names() {
        for kind in FailureKind::ALL {
            let expected = format!("{}{}", kind.action_name(), naming::ACTION_SUFFIX);
            assert_eq!(naming::action_identifier(kind.action_segment()), expected);
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(FailureKind::NoMatch.status_code(), 404);
        assert_eq!(FailureKind::NotAuthenticated.status_code(), 401);
        assert_eq!(FailureKind::NotAuthorized.status_code(), 403);
        assert_eq!(FailureKind::Uncaught.status_code(), 500);
    }

    #[test]
    fn test_uncaught_keeps_error_object() {
        let failure = DispatchFailure::uncaught(Stage::Invoking, HandlerError::msg("boom"));
        assert_eq!(failure.kind, FailureKind::Uncaught);
        assert_eq!(failure.message, "boom");
        assert!(failure.error.is_some());
        assert_eq!(failure.to_string(), "uncaught at action: boom");
    }

    #[test]
    fn test_sanitizer_strips_roots() {
        let sanitizer = Sanitizer::new(["/srv/app/", "/srv/app/vendor"]);
        assert_eq!(
            sanitizer.scrub("failed in /srv/app/vendor/lib.rs and /srv/app/src/main.rs"),
            "failed in lib.rs and src/main.rs"
        );
        assert_eq!(sanitizer.scrub("root is /srv/app"), "root is ");
        assert_eq!(Sanitizer::default().scrub("/srv/app/x"), "/srv/app/x");
    }

    #[test]
    fn test_sanitizer_keeps_longer_siblings() {
        let sanitizer = Sanitizer::new(["/srv/app"]);
        assert_eq!(sanitizer.scrub("/srv/application/x"), "/srv/application/x");
        assert_eq!(sanitizer.scrub("/srv/app.bak and /srv/app/x"), "/srv/app.bak and x");
        assert_eq!(sanitizer.scrub("(in /srv/app) at /srv/app\tend"), "(in ) at \tend");
    }
}
