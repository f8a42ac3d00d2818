//! In-memory rule store

use super::RuleStore;
use ahash::AHashMap;
use parking_lot::RwLock;

/// Rule store backed by a locked hash map
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: RwLock<AHashMap<String, String>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

impl RuleStore for MemoryRuleStore {
    fn load_text(&self, name: &str) -> Option<String> {
        self.rules.read().get(name).cloned()
    }

    fn save_text(&self, name: &str, text: &str) {
        self.rules.write().insert(name.to_string(), text.to_string());
    }

    fn exists(&self, name: &str) -> bool {
        self.rules.read().contains_key(name)
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rules.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_save_and_load() {
        let store = MemoryRuleStore::new();
        assert!(!store.exists("rule"));
        assert_eq!(store.load_text("rule"), None);

        store.save_text("rule", "age > 30");
        assert!(store.exists("rule"));
        assert_eq!(store.load_text("rule").as_deref(), Some("age > 30"));

        // Saving again replaces the text
        store.save_text("rule", "age > 40");
        assert_eq!(store.load_text("rule").as_deref(), Some("age > 40"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_names_sorted() {
        let store = MemoryRuleStore::new();
        store.save_text("b", "age > 1");
        store.save_text("a", "age > 2");
        assert_eq!(store.names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_shared_through_arc() {
        let store = Arc::new(MemoryRuleStore::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.save_text(&format!("rule{}", i), "age > 1"))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(RuleStore::names(&store).len(), 4);
        assert!(RuleStore::exists(&store, "rule3"));
    }
}
