//! Bundled error handler.
//!
//! Answers every escalation action with a short page built from the
//! `error/<kind>` template. The class name is supplied at construction so
//! the controller can be mounted under any configured name.

use crate::dispatch::dispatcher::{
    PARAM_ERROR_MESSAGE, PARAM_EXCEPTION, PARAM_REQUESTED_URL, PARAM_SOURCE,
};
use crate::dispatch::{Controller, FailureKind, HandlerError, RequestContext};
use crate::routing::naming::ACTION_SUFFIX;
use crate::routing::ParamValue;

const ACTIONS: [&str; 9] = [
    "noMatchAction",
    "noFileAction",
    "noClassAction",
    "noMethodAction",
    "noViewAction",
    "notAuthenticatedAction",
    "notAuthorizedAction",
    "uncaughtAction",
    "genericAction",
];

/// Template shared by all error pages unless overridden per kind.
pub const ERROR_TEMPLATE: &str = "{{ status }} {{ title }}\n\n{{ message }}\n{{ detail }}";

/// Template identifier used for `kind`.
pub fn template_for(kind: FailureKind) -> String {
    format!("error/{}", kind.action_segment())
}

#[derive(Debug, Clone)]
pub struct ErrorController {
    class_name: String,
}

impl ErrorController {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
        }
    }
}

impl Default for ErrorController {
    fn default() -> Self {
        Self::new("ErrorController")
    }
}

fn kind_for(action: &str) -> Option<FailureKind> {
    let name = action.strip_suffix(ACTION_SUFFIX)?;
    FailureKind::ALL.into_iter().find(|k| k.action_name() == name)
}

fn describe(kind: FailureKind) -> (&'static str, &'static str) {
    match kind {
        FailureKind::NoMatch => ("Not Found", "No route matches the requested URL."),
        FailureKind::NoFile => ("Not Found", "The requested controller does not exist."),
        FailureKind::NoClass => ("Not Found", "The requested controller could not be loaded."),
        FailureKind::NoMethod => ("Not Found", "The requested action does not exist."),
        FailureKind::NoView => ("Internal Server Error", "The page could not be rendered."),
        FailureKind::NotAuthenticated => ("Unauthorized", "Authentication is required."),
        FailureKind::NotAuthorized => ("Forbidden", "You are not allowed to access this page."),
        FailureKind::Uncaught => ("Internal Server Error", "An unexpected error occurred."),
        FailureKind::Generic => ("Internal Server Error", "The application is misconfigured."),
    }
}

impl Controller for ErrorController {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn actions(&self) -> &[&'static str] {
        &ACTIONS
    }

    fn invoke(&mut self, action: &str, ctx: &mut RequestContext) -> Result<(), HandlerError> {
        let kind = kind_for(action)
            .ok_or_else(|| HandlerError::msg(format!("unknown error action '{}'", action)))?;
        let (title, message) = describe(kind);

        let detail = match kind {
            FailureKind::Uncaught => {
                let source = ctx.named_text(PARAM_SOURCE).unwrap_or("unknown").to_string();
                let exception = ctx
                    .named(PARAM_EXCEPTION)
                    .map(ParamValue::to_string)
                    .unwrap_or_default();
                format!("{} (in {})", exception, source)
            }
            FailureKind::Generic => ctx
                .named_text(PARAM_ERROR_MESSAGE)
                .unwrap_or_default()
                .to_string(),
            _ => ctx.named_text(PARAM_REQUESTED_URL).unwrap_or_default().to_string(),
        };

        ctx.assign("status", kind.status_code());
        ctx.assign("title", title);
        ctx.assign("message", message);
        ctx.assign("detail", detail);
        ctx.view_mut().set_template(template_for(kind));
        Ok(())
    }
}
