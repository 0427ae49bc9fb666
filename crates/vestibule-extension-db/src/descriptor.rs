use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A pluggable sub-module of the host application.
///
/// Descriptors are declared by source documents and registered into the
/// [`crate::ExtensionHub`] as those documents load. They live for one
/// bootstrap run and are discarded once their trees are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
    pub name: String,
    /// Roots the extension's source tree is loaded from. Relative roots
    /// are resolved against the application root by the orchestrator.
    #[serde(default)]
    pub load_roots: Vec<PathBuf>,
    /// Self-declared abstract entries never get their trees loaded.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// The base extensible entry the hosting framework registers for
    /// itself. Never part of a discovery result.
    #[serde(default)]
    pub base: bool,
}

impl ExtensionDescriptor {
    pub fn new(name: impl Into<String>, load_roots: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            load_roots,
            is_abstract: false,
            base: false,
        }
    }

    pub fn base_entry(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            load_roots: Vec::new(),
            is_abstract: false,
            base: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn descriptor_deserializes_with_defaults() {
        let descriptor: ExtensionDescriptor =
            serde_json::from_str(r#"{"name": "billing"}"#).unwrap();
        assert_eq!(descriptor, ExtensionDescriptor::new("billing", Vec::new()));
    }

    #[test]
    fn abstract_flag_uses_the_document_spelling() {
        let descriptor: ExtensionDescriptor =
            serde_json::from_str(r#"{"name": "scaffold", "abstract": true}"#).unwrap();
        assert!(descriptor.is_abstract);
        assert!(!descriptor.base);
    }
}
