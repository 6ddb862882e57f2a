//! Startup-time controller registry.
//!
//! # Responsibilities
//! - Map fully-qualified controller names (`Admin::UserController`) to
//!   constructors
//! - Record which namespaces exist, for the router's namespace predicate
//!
//! # Design Decisions
//! - Populated by explicit registration before serving, read-only afterwards
//! - A name can be declared without a constructor; loading such a unit
//!   succeeds but instantiation does not, mirroring a source unit that
//!   defines no usable controller type

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dispatch::controller::Controller;
use crate::routing::namespace::{NamespaceRegistry, NamespaceSet};
use crate::routing::route_data::QUALIFIED_SEPARATOR;

/// Builds a controller for one request.
pub type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// What is registered under a fully-qualified name.
#[derive(Clone)]
pub enum ControllerUnit {
    /// A constructor for a conforming controller.
    Defined(ControllerFactory),
    /// A known unit that defines no controller.
    Declared,
}

impl ControllerUnit {
    /// Construct the controller, if this unit defines one.
    pub fn instantiate(&self) -> Option<Box<dyn Controller>> {
        match self {
            ControllerUnit::Defined(factory) => Some(factory()),
            ControllerUnit::Declared => None,
        }
    }
}

impl fmt::Debug for ControllerUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerUnit::Defined(_) => f.write_str("Defined(..)"),
            ControllerUnit::Declared => f.write_str("Declared"),
        }
    }
}

/// Fully-qualified controller name → unit.
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    units: HashMap<String, ControllerUnit>,
    namespaces: NamespaceSet,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `qualified`, e.g. `"Blog::PostController"`.
    pub fn register<F, C>(&mut self, qualified: &str, factory: F) -> &mut Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        let factory: ControllerFactory =
            Arc::new(move || Box::new(factory()) as Box<dyn Controller>);
        self.insert(qualified, ControllerUnit::Defined(factory))
    }

    /// Register a name that resolves to no controller type.
    pub fn declare(&mut self, qualified: &str) -> &mut Self {
        self.insert(qualified, ControllerUnit::Declared)
    }

    fn insert(&mut self, qualified: &str, unit: ControllerUnit) -> &mut Self {
        let parts: Vec<&str> = qualified.split(QUALIFIED_SEPARATOR).collect();
        if parts.len() > 1 {
            self.namespaces.insert_chain(&parts[..parts.len() - 1]);
        }
        if self.units.insert(qualified.to_string(), unit).is_some() {
            tracing::warn!(
                controller = %qualified,
                "Controller registered twice, keeping the last"
            );
        }
        self
    }

    /// Look up the unit for a fully-qualified name.
    pub fn lookup(&self, qualified: &str) -> Option<&ControllerUnit> {
        self.units.get(qualified)
    }

    pub fn is_registered(&self, qualified: &str) -> bool {
        self.units.contains_key(qualified)
    }

    /// Namespaces implied by the registered names.
    pub fn namespaces(&self) -> &NamespaceSet {
        &self.namespaces
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl NamespaceRegistry for ControllerRegistry {
    fn contains(&self, chain: &[String]) -> bool {
        self.namespaces.contains(chain)
    }
}
