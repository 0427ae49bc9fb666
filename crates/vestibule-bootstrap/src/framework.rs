use vestibule_symtab::SymbolTable;

/// Outcome of an optional framework capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureOutcome {
    Applied,
    Unsupported,
}

/// Optional capabilities of the surrounding framework.
///
/// Absence of a capability is never an error; implementations opt in
/// per method. The default for everything is [`FeatureOutcome::Unsupported`].
pub trait HostFramework {
    /// Stops deprecation warnings from being reported while the
    /// application loads.
    fn silence_deprecations(&mut self) -> FeatureOutcome {
        FeatureOutcome::Unsupported
    }

    /// Lifecycle hook invoked right before the application's eager load.
    fn before_eager_load(&mut self, _table: &SymbolTable) -> FeatureOutcome {
        FeatureOutcome::Unsupported
    }
}

/// The framework-less host: every capability is unsupported.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFramework;

impl HostFramework for NoFramework {}
