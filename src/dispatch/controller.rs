//! Controller capability contract.
//!
//! A controller is constructed fresh for every request by the factory
//! registered in the [`ControllerRegistry`](crate::dispatch::ControllerRegistry).
//! The dispatcher then runs `initialize` followed by the requested action.
//! Actions are addressed by their transformed identifier (`editInfoAction`).

use thiserror::Error;

use crate::dispatch::access::AccessRequirement;
use crate::dispatch::context::RequestContext;

/// Failure raised by controller or view code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),
    #[error("panicked: {0}")]
    Panicked(String),
    #[error("template '{template}' failed to render: {reason}")]
    Render { template: String, reason: String },
}

impl HandlerError {
    pub fn msg(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }

    /// Same error with every message passed through `f`.
    pub fn map_text(&self, f: impl Fn(&str) -> String) -> Self {
        match self {
            HandlerError::Failed(m) => HandlerError::Failed(f(m)),
            HandlerError::Panicked(m) => HandlerError::Panicked(f(m)),
            HandlerError::Render { template, reason } => HandlerError::Render {
                template: f(template),
                reason: f(reason),
            },
        }
    }
}

/// Behavior every dispatchable controller provides.
pub trait Controller: Send {
    /// Declared identifier, e.g. `"UserProfileController"`. Must equal the
    /// identifier the route resolved to.
    fn class_name(&self) -> &str;

    /// Action identifiers this controller answers to.
    fn actions(&self) -> &[&'static str];

    /// Hook run before every action.
    fn initialize(&mut self, _ctx: &mut RequestContext) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Access requirement for `action`. Public unless overridden.
    fn access(&self, _action: &str) -> AccessRequirement {
        AccessRequirement::Public
    }

    /// Run `action`. Only called with names listed by [`actions`](Self::actions).
    fn invoke(&mut self, action: &str, ctx: &mut RequestContext) -> Result<(), HandlerError>;
}
