//! Service status controller, mounted at `/status`.

use serde_json::{json, Map, Value};

use crate::dispatch::{AccessRequirement, Controller, HandlerError, RequestContext};

#[derive(Debug, Default, Clone)]
pub struct StatusController {
    started: bool,
}

impl Controller for StatusController {
    fn class_name(&self) -> &str {
        "StatusController"
    }

    fn actions(&self) -> &[&'static str] {
        &["indexAction", "echoAction", "whoamiAction"]
    }

    fn initialize(&mut self, _ctx: &mut RequestContext) -> Result<(), HandlerError> {
        self.started = true;
        Ok(())
    }

    fn access(&self, action: &str) -> AccessRequirement {
        match action {
            "whoamiAction" => AccessRequirement::Authenticated,
            _ => AccessRequirement::Public,
        }
    }

    fn invoke(&mut self, action: &str, ctx: &mut RequestContext) -> Result<(), HandlerError> {
        match action {
            // Rendered through the `status/index` template.
            "indexAction" => {
                ctx.assign("service", env!("CARGO_PKG_NAME"));
                ctx.assign("version", env!("CARGO_PKG_VERSION"));
                ctx.assign("request_id", ctx.request_id().to_string());
                Ok(())
            }
            "echoAction" => {
                let named: Map<String, Value> = ctx
                    .named_params()
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.to_string())))
                    .collect();
                let body = json!({
                    "parameters": ctx.params(),
                    "named": named,
                    "initialized": self.started,
                });
                ctx.respond(body.to_string());
                Ok(())
            }
            "whoamiAction" => {
                let identity = ctx
                    .identity()
                    .ok_or_else(|| HandlerError::msg("no identity on an authenticated request"))?;
                let body = json!({ "user": identity.user, "roles": identity.roles });
                ctx.respond(body.to_string());
                Ok(())
            }
            other => Err(HandlerError::msg(format!("unhandled action '{}'", other))),
        }
    }
}
