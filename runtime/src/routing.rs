use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Transition name -> where to go next.
pub type TransitionTable = HashMap<String, RoutingEntry>;

/// One hop of a configured knot chain.
///
/// `on_transition` is consulted with the transition returned by the knot at
/// `address`. Entries are loaded once from configuration and only read
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingEntry {
    pub address: String,
    #[serde(default)]
    pub on_transition: TransitionTable,
}

impl RoutingEntry {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            on_transition: TransitionTable::new(),
        }
    }

    /// Map `transition` to `next`.
    pub fn on(mut self, transition: impl Into<String>, next: RoutingEntry) -> Self {
        self.on_transition.insert(transition.into(), next);
        self
    }

    /// Every address reachable from this entry, itself included.
    pub fn addresses(&self) -> Vec<&str> {
        let mut found = Vec::new();
        let mut pending = vec![self];
        while let Some(entry) = pending.pop() {
            found.push(entry.address.as_str());
            pending.extend(entry.on_transition.values());
        }
        found
    }
}
