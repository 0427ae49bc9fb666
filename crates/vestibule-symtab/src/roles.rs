use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table::SymbolTable;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeclareError {
    #[error("role declared on unknown symbol `{0}`")]
    UnknownSymbol(String),
}

/// A named role with its implementing variants, as declared by a source
/// document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleDeclaration {
    pub variants: Vec<String>,
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
}

/// Captured role declarations, keyed by declaring symbol.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleRegistry {
    by_owner: BTreeMap<String, BTreeMap<String, RoleDeclaration>>,
}

impl RoleRegistry {
    pub fn record(
        &mut self,
        owner: impl Into<String>,
        role: impl Into<String>,
        declaration: RoleDeclaration,
    ) {
        self.by_owner
            .entry(owner.into())
            .or_default()
            .insert(role.into(), declaration);
    }

    pub fn roles_for(&self, owner: &str) -> Option<&BTreeMap<String, RoleDeclaration>> {
        self.by_owner.get(owner)
    }

    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.by_owner.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_owner.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_owner.is_empty()
    }
}

/// Capture-then-delegate wrapper around [`SymbolTable::declare_role`].
///
/// The capture happens before the delegated call, so the registry holds
/// every declaration that was attempted, and the table holds every one
/// that succeeded. The registry stays readable after loading finishes
/// without replaying any document.
#[derive(Debug, Default)]
pub struct RoleCapture {
    registry: RoleRegistry,
}

impl RoleCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_role(
        &mut self,
        table: &mut SymbolTable,
        owner: &str,
        role: &str,
        declaration: RoleDeclaration,
    ) -> Result<(), DeclareError> {
        self.registry.record(owner, role, declaration.clone());
        table.declare_role(owner, role, declaration)
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> RoleRegistry {
        self.registry
    }
}
