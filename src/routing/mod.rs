//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming path ("/blog/post-archive/show-by-tag/tech/page:2")
//!     → router.rs (normalize into segments)
//!     → static_table.rs (literal / pattern lookup, payload echoed)
//!     → otherwise: namespace.rs predicate + naming.rs transforms
//!     → Return: RouteData (possibly empty)
//!
//! Table Compilation (at startup):
//!     RouteConfig[]
//!     → pattern.rs (parse literal / capture / catch-all segments)
//!     → Freeze as immutable StaticRouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always resolves to the same descriptor

pub mod namespace;
pub mod naming;
pub mod pattern;
pub mod route_data;
pub mod router;
pub mod static_table;

pub use namespace::{NamespaceRegistry, NamespaceSet};
pub use route_data::{ParamValue, RouteData};
pub use router::Router;
pub use static_table::StaticRouteTable;
