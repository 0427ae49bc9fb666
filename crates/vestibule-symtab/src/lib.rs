//! Symbol table and role-declaration registry for the Vestibule bootstrap core.

mod roles;
mod table;

pub use roles::*;
pub use table::*;
