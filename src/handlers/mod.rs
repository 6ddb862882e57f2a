//! Controllers shipped with the dispatcher.
//!
//! - `error.rs`: the error handler every escalation targets
//! - `status.rs`: a small status/echo controller

pub mod error;
pub mod status;

pub use error::ErrorController;
pub use status::StatusController;

use crate::config::DispatchConfig;
use crate::dispatch::{ControllerRegistry, FailureKind, TemplateStore};
use crate::routing::naming;
use crate::routing::route_data::qualified_name;

/// Register the bundled controllers. The error handler is mounted under the
/// configured namespace and controller segment.
pub fn register_defaults(registry: &mut ControllerRegistry, config: &DispatchConfig) {
    let namespaces: Vec<String> = config
        .error_namespace
        .iter()
        .map(|s| naming::namespace_identifier(s))
        .collect();
    let class = naming::controller_identifier(&config.error_controller);
    let qualified = qualified_name(&namespaces, &class);

    if !registry.is_registered(&qualified) {
        registry.register(&qualified, move || ErrorController::new(class.clone()));
    }
    if !registry.is_registered("StatusController") {
        registry.register("StatusController", StatusController::default);
    }
}

/// Templates for the bundled controllers.
pub fn default_templates() -> TemplateStore {
    let mut store = TemplateStore::new();
    for kind in FailureKind::ALL {
        store.insert(error::template_for(kind), error::ERROR_TEMPLATE);
    }
    store.insert("status/index", "{{ service }} {{ version }} ok\nrequest {{ request_id }}");
    store
}
