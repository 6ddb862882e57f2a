//! Shared fixtures for the integration tests: a small blog application
//! with a static route table, templates and a few controllers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use route_dispatch::config::{parse_config, AppConfig};
use route_dispatch::dispatch::{
    AccessRequirement, Controller, ControllerRegistry, HandlerError, Rendered, RequestContext,
    RequestInfo,
};
use route_dispatch::handlers::ErrorController;
use route_dispatch::lifecycle::{build, Components};

pub const CONFIG: &str = r#"
namespaces = ["docs"]

[dispatch]
strip_paths = ["/srv/app"]

[[routes]]
path = "/posts/{slug}"
controller = "blog"
action = "show"

[[routes]]
path = "/blog/show/pinned"
controller = "blog"
action = "list"
named_parameters = { pinned = "yes" }

[[routes]]
path = "/files/{*rest}"
controller = "blog"
action = "list"

[templates]
"blog/show" = "<h1>{{ title }}</h1>"
"#;

pub struct BlogController;

impl Controller for BlogController {
    fn class_name(&self) -> &str {
        "BlogController"
    }

    fn actions(&self) -> &[&'static str] {
        &["showAction", "listAction", "failAction", "panicAction", "draftsAction", "bareAction"]
    }

    fn access(&self, action: &str) -> AccessRequirement {
        match action {
            "draftsAction" => AccessRequirement::Role("editor".into()),
            _ => AccessRequirement::Public,
        }
    }

    fn invoke(&mut self, action: &str, ctx: &mut RequestContext) -> Result<(), HandlerError> {
        match action {
            "showAction" => {
                let title = ctx
                    .param(0)
                    .or_else(|| ctx.named_text("slug"))
                    .unwrap_or("untitled")
                    .to_string();
                ctx.assign("title", title);
            }
            "listAction" => {
                let named: Vec<String> = ctx
                    .named_params()
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                let body = format!("list [{}] [{}]", ctx.params().join(","), named.join(","));
                ctx.respond(body);
            }
            "failAction" => return Err(HandlerError::msg("cannot open /srv/app/data/blog.db")),
            "panicAction" => panic!("kaboom"),
            "draftsAction" => ctx.respond("drafts"),
            // Leaves the view to the default template, which does not exist.
            _ => {}
        }
        Ok(())
    }
}

pub struct UserController;

impl Controller for UserController {
    fn class_name(&self) -> &str {
        "UserController"
    }

    fn actions(&self) -> &[&'static str] {
        &["editInfoAction"]
    }

    fn invoke(&mut self, _action: &str, ctx: &mut RequestContext) -> Result<(), HandlerError> {
        let id = ctx.param(0).unwrap_or_default().to_string();
        let tab = ctx.named_text("tab").unwrap_or("main").to_string();
        ctx.respond(format!("edit user {} ({})", id, tab));
        Ok(())
    }
}

/// Error handler that counts how often it is entered.
pub struct CountingErrorController {
    inner: ErrorController,
    calls: Arc<AtomicUsize>,
}

impl Controller for CountingErrorController {
    fn class_name(&self) -> &str {
        self.inner.class_name()
    }

    fn actions(&self) -> &[&'static str] {
        self.inner.actions()
    }

    fn invoke(&mut self, action: &str, ctx: &mut RequestContext) -> Result<(), HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.invoke(action, ctx)
    }
}

/// Error handler that always fails.
pub struct BrokenErrorController;

impl Controller for BrokenErrorController {
    fn class_name(&self) -> &str {
        "ErrorController"
    }

    fn actions(&self) -> &[&'static str] {
        &["noMatchAction", "noFileAction", "uncaughtAction", "genericAction"]
    }

    fn invoke(&mut self, _action: &str, _ctx: &mut RequestContext) -> Result<(), HandlerError> {
        Err(HandlerError::msg("error page is broken too"))
    }
}

pub fn config() -> AppConfig {
    parse_config(CONFIG).unwrap()
}

pub fn registry() -> ControllerRegistry {
    let mut registry = ControllerRegistry::new();
    registry
        .register("BlogController", || BlogController)
        .register("Admin::UserController", || UserController)
        .register("Api::V1::BlogController", || BlogController)
        .declare("GhostController");
    registry
}

/// The blog application with the bundled error handler.
pub fn app() -> Components {
    build(&config(), registry()).unwrap()
}

/// The blog application with an error handler that counts its calls.
pub fn counting_app() -> (Components, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut registry = registry();
    registry.register("ErrorController", move || CountingErrorController {
        inner: ErrorController::default(),
        calls: counter.clone(),
    });
    (build(&config(), registry).unwrap(), calls)
}

/// The blog application with a failing error handler.
pub fn broken_app() -> Components {
    let mut registry = registry();
    registry.register("ErrorController", || BrokenErrorController);
    build(&config(), registry).unwrap()
}

pub fn dispatch(core: &Components, path: &str) -> Rendered {
    dispatch_as(core, path, RequestInfo::new())
}

pub fn dispatch_as(core: &Components, path: &str, info: RequestInfo) -> Rendered {
    let route = core.router.resolve(path);
    core.dispatcher.dispatch(&route, &info)
}
