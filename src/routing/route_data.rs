//! Resolved decomposition of a request path.
//!
//! # Responsibilities
//! - Accumulate namespace, controller, action and parameters while the
//!   router walks a path
//! - Percent-decode positional and named parameters on insertion
//! - Report validity of the accumulated state
//! - Rebuild the canonical URL for link generation
//!
//! # Design Decisions
//! - Raw segments are kept next to their transformed identifiers so the
//!   canonical URL can be rebuilt without reversing the naming transform
//! - Insertion never fails; the dispatcher judges validity
//! - Named parameters live in a `BTreeMap` so `to_url` is deterministic

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::RouteConfig;
use crate::routing::naming;

/// Characters escaped when a parameter is written back into a path segment.
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b':')
    .add(b'?');

/// Separator between the parts of a fully-qualified controller name.
pub const QUALIFIED_SEPARATOR: &str = "::";

/// Value of a named parameter.
#[derive(Debug, Clone)]
pub enum ParamValue {
    /// Decoded text taken from the request path.
    Text(String),
    /// Arbitrary payload supplied by configuration.
    Json(serde_json::Value),
    /// Failure object handed to the error handler.
    Error(Arc<dyn std::error::Error + Send + Sync>),
}

impl ParamValue {
    /// Returns the text if this is a textual value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Json(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the failure object if this value carries one.
    pub fn as_error(&self) -> Option<&(dyn std::error::Error + Send + Sync)> {
        match self {
            ParamValue::Error(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    // Text used when the value is written into a URL. Errors have none.
    fn url_text(&self) -> Option<String> {
        match self {
            ParamValue::Text(s) => Some(s.clone()),
            ParamValue::Json(serde_json::Value::String(s)) => Some(s.clone()),
            ParamValue::Json(v) => Some(v.to_string()),
            ParamValue::Error(_) => None,
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::Text(a), ParamValue::Text(b)) => a == b,
            (ParamValue::Json(a), ParamValue::Json(b)) => a == b,
            (ParamValue::Error(a), ParamValue::Error(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::String(s) => ParamValue::Text(s),
            other => ParamValue::Json(other),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Json(v) => write!(f, "{}", v),
            ParamValue::Error(e) => write!(f, "{}", e),
        }
    }
}

/// Percent-decode a single path token. Invalid UTF-8 is replaced lossily.
pub fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

fn encode(text: &str) -> String {
    utf8_percent_encode(text, SEGMENT_ENCODE_SET).to_string()
}

/// Accumulator describing where a request should be dispatched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteData {
    namespace_segments: Vec<String>,
    namespaces: Vec<String>,
    controller_segment: Option<String>,
    controller_class_name: Option<String>,
    method_segment: Option<String>,
    method_name: Option<String>,
    parameters: Vec<String>,
    named_parameters: BTreeMap<String, ParamValue>,
    static_route: Option<Arc<RouteConfig>>,
}

impl RouteData {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a descriptor from a static route table entry.
    ///
    /// `captures` are raw `(name, value)` pairs bound by the entry's pattern and
    /// `rest` the raw segments swallowed by a trailing catch-all. Captures
    /// override the entry's default named parameters.
    pub fn from_static(
        entry: Arc<RouteConfig>,
        captures: &[(String, String)],
        rest: &[String],
    ) -> Self {
        let mut route = RouteData::new();
        for segment in &entry.namespace {
            route.add_namespace(segment);
        }
        route.set_controller(&entry.controller);
        route.set_method(&entry.action);

        route.parameters.extend(entry.parameters.iter().cloned());
        for (key, value) in &entry.named_parameters {
            route.insert_named(key.clone(), value.clone());
        }
        for (key, raw) in captures {
            route.insert_named(key.clone(), ParamValue::Text(decode(raw)));
        }
        for raw in rest {
            route.add_parameter(raw);
        }

        route.static_route = Some(entry);
        route
    }

    /// Append a namespace level.
    pub fn add_namespace(&mut self, raw: &str) {
        self.namespaces.push(naming::namespace_identifier(raw));
        self.namespace_segments.push(raw.to_string());
    }

    /// Set the controller segment.
    pub fn set_controller(&mut self, raw: &str) {
        self.controller_class_name = Some(naming::controller_identifier(raw));
        self.controller_segment = Some(raw.to_string());
    }

    /// Set the action segment.
    pub fn set_method(&mut self, raw: &str) {
        self.method_name = Some(naming::action_identifier(raw));
        self.method_segment = Some(raw.to_string());
    }

    /// Append a positional parameter, percent-decoding it.
    pub fn add_parameter(&mut self, raw: &str) {
        self.parameters.push(decode(raw));
    }

    /// Add a named parameter from a raw `key`/`value` pair, decoding both.
    pub fn add_named_parameter(&mut self, raw_key: &str, raw_value: &str) {
        self.named_parameters
            .insert(decode(raw_key), ParamValue::Text(decode(raw_value)));
    }

    /// Insert an already decoded named parameter.
    pub fn insert_named(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.named_parameters.insert(key.into(), value.into());
    }

    pub fn namespace_segments(&self) -> &[String] {
        &self.namespace_segments
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn controller_segment(&self) -> Option<&str> {
        self.controller_segment.as_deref()
    }

    pub fn controller_class_name(&self) -> Option<&str> {
        self.controller_class_name.as_deref()
    }

    pub fn method_segment(&self) -> Option<&str> {
        self.method_segment.as_deref()
    }

    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn named_parameters(&self) -> &BTreeMap<String, ParamValue> {
        &self.named_parameters
    }

    pub fn named(&self, key: &str) -> Option<&ParamValue> {
        self.named_parameters.get(key)
    }

    /// True when the descriptor came out of the static route table.
    pub fn is_static_route(&self) -> bool {
        self.static_route.is_some()
    }

    /// The static route table entry this descriptor was built from.
    pub fn static_route(&self) -> Option<&RouteConfig> {
        self.static_route.as_deref()
    }

    /// An action requires a controller, and parameters require an action.
    pub fn is_valid(&self) -> bool {
        if self.method_name.is_some() && self.controller_class_name.is_none() {
            return false;
        }
        if !self.parameters.is_empty() && self.method_name.is_none() {
            return false;
        }
        true
    }

    /// Namespaces and controller joined with `::`, e.g. `Admin::UserController`.
    pub fn qualified_controller_name(&self) -> Option<String> {
        let class = self.controller_class_name.as_deref()?;
        Some(qualified_name(&self.namespaces, class))
    }

    /// Template used when the action does not pick one explicitly:
    /// namespace, controller and action segments, lower-cased.
    pub fn default_template(&self) -> Option<String> {
        let controller = self.controller_segment.as_deref()?;
        let method = self.method_segment.as_deref()?;

        let mut parts: Vec<String> = self
            .namespace_segments
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        parts.push(controller.to_lowercase());
        parts.push(method.to_lowercase());
        Some(parts.join("/"))
    }

    /// Canonical path for this descriptor.
    ///
    /// Raw segments are written as-is; parameters are re-encoded so the router
    /// decodes them back to the same values. Error-valued named parameters are
    /// skipped.
    pub fn to_url(&self) -> String {
        let mut parts: Vec<String> = self.namespace_segments.clone();
        parts.extend(self.controller_segment.iter().cloned());
        parts.extend(self.method_segment.iter().cloned());
        parts.extend(self.parameters.iter().map(|p| encode(p)));
        for (key, value) in &self.named_parameters {
            if let Some(text) = value.url_text() {
                parts.push(format!("{}:{}", encode(key), encode(&text)));
            }
        }
        format!("/{}", parts.join("/"))
    }
}

/// Join transformed namespaces and a controller identifier.
pub fn qualified_name<S: AsRef<str>>(namespaces: &[S], class: &str) -> String {
    let mut name = String::new();
    for ns in namespaces {
        name.push_str(ns.as_ref());
        name.push_str(QUALIFIED_SEPARATOR);
    }
    name.push_str(class);
    name
}
