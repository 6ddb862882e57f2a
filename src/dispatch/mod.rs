//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! RouteData (from routing)
//!     → dispatcher.rs
//!         Matching       (RouteData::is_valid)             ─┐
//!         Loading        (registry.rs lookup)               │
//!         Instantiating  (registry.rs constructor)          │ failure.rs
//!         AuthChecking   (access.rs policy)                 ├─▶ escalate once
//!         Invoking       (controller.rs, context.rs)        │   to the error
//!         ViewResolving  (view.rs)                         ─┘   handler
//!     → Rendered (body + status hint)
//! ```
//!
//! # Design Decisions
//! - Controller lookup is a startup-time registry, never a filesystem probe
//! - Failures are values, not unwinding; one escalation at most
//! - Per-request state lives in `RequestContext`, nothing is global

pub mod access;
pub mod context;
pub mod controller;
pub mod dispatcher;
pub mod failure;
pub mod registry;
pub mod view;

pub use access::{AccessDecision, AccessPolicy, AccessRequirement, IdentityPolicy};
pub use context::{Identity, RequestContext, RequestInfo, ViewModel};
pub use controller::{Controller, HandlerError};
pub use dispatcher::{Dispatcher, Rendered};
pub use failure::{DispatchFailure, FailureKind, Sanitizer, Stage};
pub use registry::{ControllerRegistry, ControllerUnit};
pub use view::{TemplateStore, ViewRenderer};
