//! Source document model and load primitive for the Vestibule bootstrap core.

mod document;
mod loader;

pub use document::*;
pub use loader::*;
