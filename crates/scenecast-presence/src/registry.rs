//! Context name to presence descriptor mapping.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use scenecast_config::ContextsConfig;
use tracing::debug;

use crate::descriptor::PresenceDescriptor;

/// Shared, mutable registry of per-context descriptors.
///
/// Cloning yields another handle onto the same mapping, so the host can
/// keep writing while the manager reads. Names are matched exactly; no
/// case folding or trimming is applied. Lookups return a snapshot copy.
#[derive(Debug, Clone, Default)]
pub struct ContextRegistry {
    entries: Arc<RwLock<HashMap<String, PresenceDescriptor>>>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the `[contexts.*]` tables of a config.
    pub fn from_config(contexts: &ContextsConfig) -> Self {
        let registry = Self::new();
        registry.reload_from_config(contexts);
        registry
    }

    /// Insert or overwrite. Returns the descriptor previously stored under `name`.
    pub fn register(
        &self,
        name: impl Into<String>,
        descriptor: PresenceDescriptor,
    ) -> Option<PresenceDescriptor> {
        let name = name.into();
        debug!(context = %name, "registering context presence");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, descriptor)
    }

    pub fn lookup(&self, name: &str) -> Option<PresenceDescriptor> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn remove(&self, name: &str) -> Option<PresenceDescriptor> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered context names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Swap the whole mapping in one write.
    pub fn replace_all(&self, entries: HashMap<String, PresenceDescriptor>) {
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = entries;
    }

    /// Replace the mapping with the entries of `contexts`. Returns the new size.
    pub fn reload_from_config(&self, contexts: &ContextsConfig) -> usize {
        let entries: HashMap<String, PresenceDescriptor> = contexts
            .iter()
            .map(|(name, entry)| (name.clone(), PresenceDescriptor::from(entry)))
            .collect();
        let count = entries.len();
        self.replace_all(entries);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecast_config::ContextPresence;

    #[test]
    fn lookup_missing_returns_none() {
        let registry = ContextRegistry::new();
        assert!(registry.lookup("Lobby").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn register_then_lookup() {
        let registry = ContextRegistry::new();
        let lobby = PresenceDescriptor::idle("In Lobby");
        assert!(registry.register("Lobby", lobby.clone()).is_none());
        assert_eq!(registry.lookup("Lobby"), Some(lobby));
        assert!(registry.contains("Lobby"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn last_write_wins() {
        let registry = ContextRegistry::new();
        registry.register("Menu", PresenceDescriptor::idle("first"));
        let previous = registry.register("Menu", PresenceDescriptor::idle("second"));

        assert_eq!(previous, Some(PresenceDescriptor::idle("first")));
        assert_eq!(registry.lookup("Menu"), Some(PresenceDescriptor::idle("second")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn matching_is_case_sensitive_and_exact() {
        let registry = ContextRegistry::new();
        registry.register("Menu", PresenceDescriptor::idle("In Menu"));

        assert!(registry.lookup("menu").is_none());
        assert!(registry.lookup("MENU").is_none());
        assert!(registry.lookup(" Menu").is_none());
        assert!(registry.lookup("Menu").is_some());
    }

    #[test]
    fn clones_share_the_mapping() {
        let host = ContextRegistry::new();
        let reader = host.clone();

        host.register("Shop", PresenceDescriptor::idle("Shopping"));
        assert_eq!(reader.lookup("Shop"), Some(PresenceDescriptor::idle("Shopping")));

        reader.remove("Shop");
        assert!(host.lookup("Shop").is_none());
    }

    #[test]
    fn lookup_returns_a_snapshot() {
        let registry = ContextRegistry::new();
        registry.register("Menu", PresenceDescriptor::idle("before"));
        let snapshot = registry.lookup("Menu").unwrap();

        registry.register("Menu", PresenceDescriptor::idle("after"));
        assert_eq!(snapshot.state(), Some("before"));
    }

    #[test]
    fn names_are_sorted() {
        let registry = ContextRegistry::new();
        registry.register("b", PresenceDescriptor::default());
        registry.register("a", PresenceDescriptor::default());
        registry.register("C", PresenceDescriptor::default());
        assert_eq!(registry.names(), vec!["C", "a", "b"]);
    }

    #[test]
    fn from_config_converts_entries() {
        let mut contexts = ContextsConfig::new();
        contexts.insert(
            "Menu".into(),
            ContextPresence {
                state: Some("In Menu".into()),
                ..Default::default()
            },
        );
        let registry = ContextRegistry::from_config(&contexts);
        assert_eq!(registry.lookup("Menu"), Some(PresenceDescriptor::idle("In Menu")));
    }

    #[test]
    fn reload_replaces_everything() {
        let registry = ContextRegistry::new();
        registry.register("Old", PresenceDescriptor::idle("old"));

        let mut contexts = ContextsConfig::new();
        contexts.insert("New".into(), ContextPresence::default());
        let count = registry.reload_from_config(&contexts);

        assert_eq!(count, 1);
        assert!(registry.lookup("Old").is_none());
        assert!(registry.contains("New"));
    }
}
