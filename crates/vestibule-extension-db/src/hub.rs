use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::descriptor::ExtensionDescriptor;

static GLOBAL: Lazy<Arc<ExtensionHub>> = Lazy::new(|| Arc::new(ExtensionHub::new()));

/// Process-wide ordered list of extension registrations.
///
/// Extension declarations land here as their defining documents load;
/// discovery filters the list. Registration order is the only order the
/// hub knows.
#[derive(Debug, Default)]
pub struct ExtensionHub {
    entries: Mutex<Vec<ExtensionDescriptor>>,
}

impl ExtensionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// The hub extension definitions reach when no explicit hub is wired
    /// in, one per process.
    pub fn global() -> Arc<ExtensionHub> {
        Arc::clone(&GLOBAL)
    }

    /// Registers a descriptor, keeping at most one entry per name. A
    /// re-registration replaces the earlier entry in place, so a
    /// document retried after a partial load does not duplicate it.
    pub fn register(&self, descriptor: ExtensionDescriptor) {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries
            .iter_mut()
            .find(|entry| entry.name == descriptor.name)
        {
            *existing = descriptor;
        } else {
            log::debug!("registered extension `{}`", descriptor.name);
            entries.push(descriptor);
        }
    }

    pub fn entries(&self) -> Vec<ExtensionDescriptor> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Ordered discovery: each non-base entry is placed at the front,
    /// so the result is the reverse of registration order, then
    /// abstract entries are dropped. Callers must not assume the order
    /// tracks declaration or dependency order.
    pub fn discover(&self) -> Vec<ExtensionDescriptor> {
        let mut found: Vec<ExtensionDescriptor> = Vec::new();
        for entry in self.entries.lock().iter() {
            if entry.base {
                continue;
            }
            found.insert(0, entry.clone());
        }
        found.retain(|entry| !entry.is_abstract);
        found
    }
}

/// Discovery entry point for the orchestrator. `None` means the hosting
/// framework never installed a hub, which yields no extensions rather
/// than an error.
pub fn discover_extensions(hub: Option<&ExtensionHub>) -> Vec<ExtensionDescriptor> {
    match hub {
        Some(hub) => hub.discover(),
        None => Vec::new(),
    }
}
