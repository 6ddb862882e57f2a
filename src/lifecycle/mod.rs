//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     load config → register controllers → startup.rs builds
//!     StaticRouteTable + Router + Dispatcher → HTTP server accepts
//!
//! Shutdown:
//!     ctrl-c → HTTP server stops accepting → in-flight dispatches finish
//! ```

pub mod startup;

pub use startup::{build, Components, StartupError};
