//! Request dispatch lifecycle.
//!
//! # Responsibilities
//! - Run a resolved route through match check, loading, instantiation,
//!   access checks, invocation and view resolution
//! - Escalate the first failure to the error handler
//! - Answer with a minimal fallback when the escalation fails too
//!
//! # Design Decisions
//! - Stages return `Result<String, DispatchFailure>`; escalation is a plain
//!   match on the failure, never unwinding
//! - At most one escalation per request, enforced by the `Attempt` passed
//!   into the pipeline
//! - Panics in controller or view code are caught and classified as
//!   uncaught failures
//! - Diagnostic text is scrubbed of install paths before it reaches the
//!   error handler

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::config::DispatchConfig;
use crate::dispatch::access::{AccessDecision, AccessPolicy, IdentityPolicy};
use crate::dispatch::context::{RequestContext, RequestInfo};
use crate::dispatch::controller::HandlerError;
use crate::dispatch::failure::{DispatchFailure, FailureKind, Sanitizer, Stage};
use crate::dispatch::registry::ControllerRegistry;
use crate::dispatch::view::{TemplateStore, ViewRenderer};
use crate::observability::metrics;
use crate::routing::{ParamValue, RouteData};

/// Named parameter carrying the error message of a generic failure.
pub const PARAM_ERROR_MESSAGE: &str = "errorMessage";
/// Named parameter carrying the failure object of an uncaught failure.
pub const PARAM_EXCEPTION: &str = "exception";
/// Named parameter carrying the stage tag of an uncaught failure.
pub const PARAM_SOURCE: &str = "source";
/// Named parameter carrying the canonical URL of the failed request.
pub const PARAM_REQUESTED_URL: &str = "requestedUrl";

/// Result of a dispatch, always produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub body: String,
    /// HTTP status hint.
    pub status: u16,
    /// The failure that was escalated, if any.
    pub failure: Option<FailureKind>,
    /// True when the error handler could not render and the fallback was used.
    pub fallback: bool,
}

impl Rendered {
    fn ok(body: String) -> Self {
        Self {
            body,
            status: 200,
            failure: None,
            fallback: false,
        }
    }

    fn escalated(kind: FailureKind, body: String) -> Self {
        Self {
            body,
            status: kind.status_code(),
            failure: Some(kind),
            fallback: false,
        }
    }

    // Plain text with no dependency on controllers, views or config.
    fn fallback(kind: FailureKind, second: FailureKind) -> Self {
        Self {
            body: format!(
                "500 Internal Server Error\n\nThe request failed ({}) \
                 and the error handler failed as well ({}).\n",
                kind, second
            ),
            status: 500,
            failure: Some(kind),
            fallback: true,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Primary,
    Escalation,
}

/// Drives a [`RouteData`] to a rendered response.
pub struct Dispatcher {
    registry: Arc<ControllerRegistry>,
    views: Arc<dyn ViewRenderer>,
    access: Arc<dyn AccessPolicy>,
    error_namespace: Vec<String>,
    error_controller: String,
    sanitizer: Sanitizer,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("controllers", &self.registry.len())
            .field("error_namespace", &self.error_namespace)
            .field("error_controller", &self.error_controller)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Dispatcher with the default error handler (`error` at the root) and
    /// no path scrubbing.
    pub fn new(
        registry: Arc<ControllerRegistry>,
        views: Arc<dyn ViewRenderer>,
        access: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self {
            registry,
            views,
            access,
            error_namespace: Vec::new(),
            error_controller: "error".to_string(),
            sanitizer: Sanitizer::default(),
        }
    }

    /// Dispatcher with an empty template store and the identity policy.
    pub fn with_registry(registry: Arc<ControllerRegistry>) -> Self {
        Self::new(registry, Arc::new(TemplateStore::new()), Arc::new(IdentityPolicy))
    }

    /// Apply error handler location and scrubbing from configuration.
    pub fn configure(mut self, config: &DispatchConfig) -> Self {
        self.error_namespace = config.error_namespace.clone();
        self.error_controller = config.error_controller.clone();
        self.sanitizer = Sanitizer::new(config.strip_paths.iter().cloned());
        self
    }

    /// Dispatch a resolved route.
    pub fn dispatch(&self, route: &RouteData, info: &RequestInfo) -> Rendered {
        let start = Instant::now();
        let url = self.sanitizer.scrub(&route.to_url());
        let span = tracing::info_span!("dispatch", request_id = %info.request_id, url = %url);
        let _enter = span.enter();

        let rendered = match self.run(route, info, Attempt::Primary) {
            Ok(body) => {
                tracing::info!(
                    controller = ?route.qualified_controller_name(),
                    action = ?route.method_name(),
                    "Dispatched"
                );
                Rendered::ok(body)
            }
            Err(failure) => self.escalate(failure, route, info),
        };

        metrics::record_dispatch(outcome_label(&rendered), start);
        rendered
    }

    /// Escalate an externally detected configuration error for `route`.
    pub fn dispatch_generic(
        &self,
        message: &str,
        route: &RouteData,
        info: &RequestInfo,
    ) -> Rendered {
        let start = Instant::now();
        let url = self.sanitizer.scrub(&route.to_url());
        let span = tracing::info_span!("dispatch", request_id = %info.request_id, url = %url);
        let _enter = span.enter();

        let rendered = self.escalate(DispatchFailure::generic(message), route, info);
        metrics::record_dispatch(outcome_label(&rendered), start);
        rendered
    }

    fn escalate(
        &self,
        failure: DispatchFailure,
        original: &RouteData,
        info: &RequestInfo,
    ) -> Rendered {
        tracing::warn!(
            kind = %failure.kind,
            stage = %failure.stage,
            message = %self.sanitizer.scrub(&failure.message),
            "Escalating to error handler"
        );
        metrics::record_escalation(failure.kind);

        let target = self.error_route(&failure, original);
        match self.run(&target, info, Attempt::Escalation) {
            Ok(body) => Rendered::escalated(failure.kind, body),
            Err(second) => {
                tracing::error!(
                    kind = %failure.kind,
                    escalation_kind = %second.kind,
                    escalation_stage = %second.stage,
                    message = %self.sanitizer.scrub(&second.message),
                    "Error handler failed, answering with fallback"
                );
                metrics::record_fallback();
                Rendered::fallback(failure.kind, second.kind)
            }
        }
    }

    /// Descriptor targeting the error handler action for `failure`.
    fn error_route(&self, failure: &DispatchFailure, original: &RouteData) -> RouteData {
        let mut route = RouteData::new();
        for segment in &self.error_namespace {
            route.add_namespace(segment);
        }
        route.set_controller(&self.error_controller);
        route.set_method(failure.kind.action_segment());

        route.insert_named(PARAM_REQUESTED_URL, self.sanitizer.scrub(&original.to_url()));
        match failure.kind {
            FailureKind::Generic => {
                route.insert_named(PARAM_ERROR_MESSAGE, self.sanitizer.scrub(&failure.message));
            }
            FailureKind::Uncaught => {
                let error = match &failure.error {
                    Some(error) => error.map_text(|s| self.sanitizer.scrub(s)),
                    None => HandlerError::msg(self.sanitizer.scrub(&failure.message)),
                };
                route.insert_named(PARAM_EXCEPTION, ParamValue::Error(Arc::new(error)));
                route.insert_named(PARAM_SOURCE, failure.stage.as_str());
            }
            _ => {}
        }
        route
    }

    fn run(
        &self,
        route: &RouteData,
        info: &RequestInfo,
        attempt: Attempt,
    ) -> Result<String, DispatchFailure> {
        // Matching. The error route is built here, so escalation starts at loading.
        if attempt == Attempt::Primary && !route.is_valid() {
            return Err(DispatchFailure::new(
                FailureKind::NoMatch,
                Stage::Matching,
                "route is not valid",
            ));
        }
        let (qualified, class, method) = match (
            route.qualified_controller_name(),
            route.controller_class_name(),
            route.method_name(),
        ) {
            (Some(qualified), Some(class), Some(method)) => (qualified, class, method),
            _ => {
                return Err(DispatchFailure::new(
                    FailureKind::NoMatch,
                    Stage::Matching,
                    "no controller or action resolved",
                ))
            }
        };

        // Loading
        let unit = self.registry.lookup(&qualified).ok_or_else(|| {
            DispatchFailure::new(
                FailureKind::NoFile,
                Stage::Loading,
                format!("no controller unit named '{}'", qualified),
            )
        })?;

        // Instantiating
        let instance = guarded(Stage::Instantiating, || unit.instantiate())?;
        let mut controller = instance.ok_or_else(|| {
            DispatchFailure::new(
                FailureKind::NoClass,
                Stage::Instantiating,
                format!("'{}' defines no controller", qualified),
            )
        })?;
        let declared = guarded(Stage::Instantiating, || controller.class_name().to_string())?;
        if declared != class {
            return Err(DispatchFailure::new(
                FailureKind::NoClass,
                Stage::Instantiating,
                format!("'{}' declares '{}', expected '{}'", qualified, declared, class),
            ));
        }

        let mut ctx = RequestContext::new(route, info);

        // AuthChecking
        let requirement = guarded(Stage::AuthChecking, || controller.access(method))?;
        match guarded(Stage::AuthChecking, || self.access.check(&requirement, &ctx))? {
            AccessDecision::Granted => {}
            AccessDecision::Unauthenticated => {
                return Err(DispatchFailure::new(
                    FailureKind::NotAuthenticated,
                    Stage::AuthChecking,
                    format!("{}::{} requires authentication", qualified, method),
                ))
            }
            AccessDecision::Forbidden => {
                return Err(DispatchFailure::new(
                    FailureKind::NotAuthorized,
                    Stage::AuthChecking,
                    format!("{}::{} is not permitted", qualified, method),
                ))
            }
        }

        // Invoking
        if !guarded(Stage::Invoking, || controller.actions().contains(&method))? {
            return Err(DispatchFailure::new(
                FailureKind::NoMethod,
                Stage::Invoking,
                format!("'{}' has no action '{}'", qualified, method),
            ));
        }
        invoke_guarded(Stage::Initializing, || controller.initialize(&mut ctx))?;
        invoke_guarded(Stage::Invoking, || controller.invoke(method, &mut ctx))?;

        // ViewResolving
        if let Some(body) = ctx.take_body() {
            return Ok(body);
        }
        self.render(route, &ctx)
    }

    fn render(&self, route: &RouteData, ctx: &RequestContext) -> Result<String, DispatchFailure> {
        let template = ctx
            .view()
            .template()
            .map(str::to_string)
            .or_else(|| route.default_template())
            .ok_or_else(|| {
                DispatchFailure::new(FailureKind::NoView, Stage::ViewResolving, "no template")
            })?;

        if !self.views.exists(&template) {
            return Err(DispatchFailure::new(
                FailureKind::NoView,
                Stage::ViewResolving,
                format!("template '{}' does not exist", template),
            ));
        }

        let views = &self.views;
        let mut rendered = String::new();
        invoke_guarded(Stage::ViewResolving, || {
            rendered = views.render(&template, ctx.view())?;
            Ok(())
        })?;
        Ok(rendered)
    }
}

// Run controller or view code, turning a panic into an uncaught failure.
fn guarded<T, F>(stage: Stage, f: F) -> Result<T, DispatchFailure>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        DispatchFailure::uncaught(stage, HandlerError::Panicked(panic_message(payload)))
    })
}

// As `guarded`, with returned errors classified as uncaught too.
fn invoke_guarded<F>(stage: Stage, f: F) -> Result<(), DispatchFailure>
where
    F: FnOnce() -> Result<(), HandlerError>,
{
    guarded(stage, f)?.map_err(|error| DispatchFailure::uncaught(stage, error))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn outcome_label(rendered: &Rendered) -> &'static str {
    match (rendered.failure, rendered.fallback) {
        (None, _) => "ok",
        (Some(_), false) => "escalated",
        (Some(_), true) => "fallback",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::access::AccessRequirement;
    use crate::dispatch::context::Identity;
    use crate::dispatch::controller::Controller;

    struct BlogController;

    impl Controller for BlogController {
        fn class_name(&self) -> &str {
            "BlogController"
        }

        fn actions(&self) -> &[&'static str] {
            &["showAction", "rawAction", "failAction", "panicAction", "secretAction", "adminAction"]
        }

        fn access(&self, action: &str) -> AccessRequirement {
            match action {
                "secretAction" => AccessRequirement::Authenticated,
                "adminAction" => AccessRequirement::Role("admin".into()),
                _ => AccessRequirement::Public,
            }
        }

        fn invoke(&mut self, action: &str, ctx: &mut RequestContext) -> Result<(), HandlerError> {
            match action {
                "showAction" => {
                    let title = ctx.param(0).unwrap_or("none").to_string();
                    ctx.assign("title", title);
                    Ok(())
                }
                "failAction" => Err(HandlerError::msg("database at /srv/app/data.db is gone")),
                "panicAction" => panic!("kaboom"),
                _ => {
                    ctx.respond("raw");
                    Ok(())
                }
            }
        }
    }

    struct ErrorController;

    impl Controller for ErrorController {
        fn class_name(&self) -> &str {
            "ErrorController"
        }

        fn actions(&self) -> &[&'static str] {
            &[
                "noMatchAction",
                "noFileAction",
                "noClassAction",
                "noMethodAction",
                "noViewAction",
                "notAuthenticatedAction",
                "notAuthorizedAction",
                "uncaughtAction",
                "genericAction",
            ]
        }

        fn invoke(&mut self, action: &str, ctx: &mut RequestContext) -> Result<(), HandlerError> {
            let mut body = action.to_string();
            if let Some(source) = ctx.named_text(PARAM_SOURCE) {
                body.push_str(&format!(" source={}", source));
            }
            if let Some(error) = ctx.named(PARAM_EXCEPTION).and_then(ParamValue::as_error) {
                body.push_str(&format!(" exception={}", error));
            }
            if let Some(message) = ctx.named_text(PARAM_ERROR_MESSAGE) {
                body.push_str(&format!(" message={}", message));
            }
            ctx.respond(body);
            Ok(())
        }
    }

    fn dispatcher(with_error_handler: bool) -> Dispatcher {
        let mut registry = ControllerRegistry::new();
        registry.register("BlogController", || BlogController);
        registry.declare("EmptyController");
        registry.register("ImpostorController", || BlogController);
        if with_error_handler {
            registry.register("ErrorController", || ErrorController);
        }

        let mut templates = TemplateStore::new();
        templates.insert("blog/show", "Title: {{ title }}");

        let config = DispatchConfig {
            strip_paths: vec!["/srv/app".into()],
            ..DispatchConfig::default()
        };
        Dispatcher::new(Arc::new(registry), Arc::new(templates), Arc::new(IdentityPolicy))
            .configure(&config)
    }

    fn route(controller: &str, action: &str) -> RouteData {
        let mut route = RouteData::new();
        route.set_controller(controller);
        route.set_method(action);
        route
    }

    #[test]
    fn test_renders_default_template() {
        let mut r = route("blog", "show");
        r.add_parameter("Hello");
        let out = dispatcher(true).dispatch(&r, &RequestInfo::new());
        assert_eq!(out, Rendered::ok("Title: Hello".into()));
    }

    #[test]
    fn test_direct_response_skips_view() {
        let out = dispatcher(true).dispatch(&route("blog", "raw"), &RequestInfo::new());
        assert!(out.is_success());
        assert_eq!(out.body, "raw");
    }

    #[test]
    fn test_empty_route_escalates_no_match() {
        let out = dispatcher(true).dispatch(&RouteData::new(), &RequestInfo::new());
        assert_eq!(out.failure, Some(FailureKind::NoMatch));
        assert_eq!(out.status, 404);
        assert!(!out.fallback);
        assert_eq!(out.body, "noMatchAction");
    }

    #[test]
    fn test_invalid_route_escalates_no_match() {
        let mut r = RouteData::new();
        r.set_method("show");
        let out = dispatcher(true).dispatch(&r, &RequestInfo::new());
        assert_eq!(out.failure, Some(FailureKind::NoMatch));
    }

    #[test]
    fn test_failure_kinds() {
        let d = dispatcher(true);
        let cases = [
            (route("missing", "show"), FailureKind::NoFile, "noFileAction"),
            (route("empty", "show"), FailureKind::NoClass, "noClassAction"),
            (route("impostor", "show"), FailureKind::NoClass, "noClassAction"),
            (route("blog", "missing"), FailureKind::NoMethod, "noMethodAction"),
            (route("blog", "admin"), FailureKind::NotAuthenticated, "notAuthenticatedAction"),
        ];
        for (r, kind, body) in cases {
            let out = d.dispatch(&r, &RequestInfo::new());
            assert_eq!(out.failure, Some(kind), "{}", r.to_url());
            assert_eq!(out.body, body);
            assert_eq!(out.status, kind.status_code());
        }
    }

    #[test]
    fn test_no_view_when_template_missing() {
        let ada = RequestInfo::new().with_identity(Identity::new("ada"));
        let out = dispatcher(true).dispatch(&route("blog", "secret"), &ada);
        // secretAction responds directly once authenticated
        assert!(out.is_success());

        let mut d = dispatcher(true);
        d.views = Arc::new(TemplateStore::new());
        let out = d.dispatch(&route("blog", "show"), &RequestInfo::new());
        assert_eq!(out.failure, Some(FailureKind::NoView));
        assert_eq!(out.status, 500);
    }

    #[test]
    fn test_authorization() {
        let d = dispatcher(true);
        let user = RequestInfo::new().with_identity(Identity::new("bob"));
        let admin = RequestInfo::new().with_identity(Identity::new("ada").with_role("admin"));

        assert_eq!(
            d.dispatch(&route("blog", "admin"), &user).failure,
            Some(FailureKind::NotAuthorized)
        );
        assert!(d.dispatch(&route("blog", "admin"), &admin).is_success());
    }

    #[test]
    fn test_uncaught_error_is_scrubbed() {
        let out = dispatcher(true).dispatch(&route("blog", "fail"), &RequestInfo::new());
        assert_eq!(out.failure, Some(FailureKind::Uncaught));
        assert_eq!(out.body, "uncaughtAction source=action exception=database at data.db is gone");
    }

    #[test]
    fn test_panic_is_uncaught() {
        let out = dispatcher(true).dispatch(&route("blog", "panic"), &RequestInfo::new());
        assert_eq!(out.failure, Some(FailureKind::Uncaught));
        assert_eq!(out.body, "uncaughtAction source=action exception=panicked: kaboom");
    }

    #[test]
    fn test_generic_failure() {
        let out = dispatcher(true).dispatch_generic(
            "bad config in /srv/app/app.toml",
            &RouteData::new(),
            &RequestInfo::new(),
        );
        assert_eq!(out.failure, Some(FailureKind::Generic));
        assert_eq!(out.body, "genericAction message=bad config in app.toml");
    }

    #[test]
    fn test_broken_error_handler_falls_back_once() {
        let out = dispatcher(false).dispatch(&RouteData::new(), &RequestInfo::new());
        assert!(out.fallback);
        assert_eq!(out.status, 500);
        assert_eq!(out.failure, Some(FailureKind::NoMatch));
        assert!(out.body.contains("noMatch"));
        assert!(out.body.contains("noFile"));
    }

    struct GuardedController;

    impl Controller for GuardedController {
        fn class_name(&self) -> &str {
            "GuardedController"
        }

        fn actions(&self) -> &[&'static str] {
            &["showAction"]
        }

        fn access(&self, _action: &str) -> AccessRequirement {
            panic!("policy lookup failed")
        }

        fn invoke(&mut self, _action: &str, _ctx: &mut RequestContext) -> Result<(), HandlerError> {
            Ok(())
        }
    }

    fn dispatcher_with(registry: ControllerRegistry) -> Dispatcher {
        Dispatcher::new(
            Arc::new(registry),
            Arc::new(TemplateStore::new()),
            Arc::new(IdentityPolicy),
        )
    }

    #[test]
    fn test_constructor_panic_is_uncaught() {
        let mut registry = ControllerRegistry::new();
        registry.register("BlogController", || -> BlogController { panic!("ctor boom") });
        registry.register("ErrorController", || ErrorController);

        let out = dispatcher_with(registry).dispatch(&route("blog", "show"), &RequestInfo::new());
        assert_eq!(out.failure, Some(FailureKind::Uncaught));
        assert!(!out.fallback);
        assert_eq!(
            out.body,
            "uncaughtAction source=instantiate exception=panicked: ctor boom"
        );
    }

    #[test]
    fn test_access_panic_is_uncaught() {
        let mut registry = ControllerRegistry::new();
        registry.register("GuardedController", || GuardedController);
        registry.register("ErrorController", || ErrorController);

        let out =
            dispatcher_with(registry).dispatch(&route("guarded", "show"), &RequestInfo::new());
        assert_eq!(out.failure, Some(FailureKind::Uncaught));
        assert_eq!(
            out.body,
            "uncaughtAction source=auth exception=panicked: policy lookup failed"
        );
    }

    #[test]
    fn test_error_handler_constructor_panic_falls_back() {
        let mut registry = ControllerRegistry::new();
        registry.register("ErrorController", || -> ErrorController { panic!("handler boom") });

        let out = dispatcher_with(registry).dispatch(&RouteData::new(), &RequestInfo::new());
        assert!(out.fallback);
        assert_eq!(out.status, 500);
        assert_eq!(out.failure, Some(FailureKind::NoMatch));
        assert!(out.body.contains("uncaught"));
    }

    #[test]
    fn test_error_route_shape() {
        let d = dispatcher(true);
        let failure = DispatchFailure::uncaught(Stage::Initializing, HandlerError::msg("x"));
        let r = d.error_route(&failure, &route("blog", "show"));

        assert_eq!(r.controller_class_name(), Some("ErrorController"));
        assert_eq!(r.method_name(), Some("uncaughtAction"));
        assert_eq!(r.named(PARAM_SOURCE).and_then(ParamValue::as_text), Some("initialize"));
        assert_eq!(r.named(PARAM_REQUESTED_URL).and_then(ParamValue::as_text), Some("/blog/show"));
        assert!(r.named(PARAM_EXCEPTION).and_then(ParamValue::as_error).is_some());
    }
}
