//! Per-request context handed to controllers.
//!
//! # Responsibilities
//! - Carry the request identity and id into the controller
//! - Expose positional parameters in order and named parameters merged
//! - Collect the view model or a direct response body
//!
//! # Design Decisions
//! - Built by the dispatcher for one request and passed `&mut` into the
//!   controller; never stored in process-wide state

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::routing::{ParamValue, RouteData};

/// Authenticated caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub roles: Vec<String>,
}

impl Identity {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Request facts supplied by the host.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub request_id: Uuid,
    pub identity: Option<Identity>,
}

impl RequestInfo {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            identity: None,
        }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }
}

impl Default for RequestInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Template choice and variables produced by an action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewModel {
    template: Option<String>,
    vars: BTreeMap<String, serde_json::Value>,
}

impl ViewModel {
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn vars(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.vars
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.vars.get(key)
    }

    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = Some(template.into());
    }

    pub fn assign(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.vars.insert(key.into(), value.into());
    }
}

/// Everything a controller sees of the current request.
#[derive(Debug)]
pub struct RequestContext {
    request_id: Uuid,
    identity: Option<Identity>,
    route: RouteData,
    named: BTreeMap<String, ParamValue>,
    view: ViewModel,
    body: Option<String>,
}

impl RequestContext {
    pub fn new(route: &RouteData, info: &RequestInfo) -> Self {
        Self {
            request_id: info.request_id,
            identity: info.identity.clone(),
            route: route.clone(),
            named: route.named_parameters().clone(),
            view: ViewModel::default(),
            body: None,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The descriptor this request was dispatched with.
    pub fn route(&self) -> &RouteData {
        &self.route
    }

    /// Positional parameters, in path order.
    pub fn params(&self) -> &[String] {
        self.route.parameters()
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.route.parameters().get(index).map(String::as_str)
    }

    pub fn named_params(&self) -> &BTreeMap<String, ParamValue> {
        &self.named
    }

    pub fn named(&self, key: &str) -> Option<&ParamValue> {
        self.named.get(key)
    }

    pub fn named_text(&self, key: &str) -> Option<&str> {
        self.named.get(key).and_then(ParamValue::as_text)
    }

    pub fn set_named(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.named.insert(key.into(), value.into());
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewModel {
        &mut self.view
    }

    /// Shorthand for `view_mut().assign(..)`.
    pub fn assign(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.view.assign(key, value);
    }

    /// Answer with `body` directly, bypassing view resolution.
    pub fn respond(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub(crate) fn take_body(&mut self) -> Option<String> {
        self.body.take()
    }
}
