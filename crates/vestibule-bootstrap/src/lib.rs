//! Staged bootstrap orchestrator for Vestibule applications.
//!
//! Brings a host application (main module plus pluggable extensions)
//! into a fully-loaded symbol table: dependency bundle, application
//! entry point, extension discovery, then one resilient tree load per
//! extension. Strictly sequential; every load mutates one table.

mod app;
mod bootstrap;
mod bundle;
mod framework;
mod tree;

pub use app::*;
pub use bootstrap::*;
pub use bundle::*;
pub use framework::*;
pub use tree::*;
