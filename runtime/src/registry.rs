use knotwork_core::Knot;
use std::collections::HashMap;
use std::sync::Arc;

/// Address -> knot implementation.
///
/// Filled once while bootstrapping; the router resolves addresses through it
/// lazily and never modifies it.
#[derive(Clone, Default)]
pub struct KnotRegistry {
    knots: HashMap<String, Arc<dyn Knot>>,
}

impl KnotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `knot` under `address`, replacing any previous registration.
    pub fn register<K: Knot>(mut self, address: impl Into<String>, knot: K) -> Self {
        self.insert(address, Arc::new(knot));
        self
    }

    pub fn insert(&mut self, address: impl Into<String>, knot: Arc<dyn Knot>) {
        self.knots.insert(address.into(), knot);
    }

    pub fn get(&self, address: &str) -> Option<Arc<dyn Knot>> {
        self.knots.get(address).cloned()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.knots.contains_key(address)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.knots.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for KnotRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut addresses: Vec<_> = self.addresses().collect();
        addresses.sort_unstable();
        f.debug_struct("KnotRegistry")
            .field("addresses", &addresses)
            .finish()
    }
}
