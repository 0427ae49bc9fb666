//! Extension registry and discovery for the Vestibule bootstrap core.

mod descriptor;
mod hub;

pub use descriptor::*;
pub use hub::*;
