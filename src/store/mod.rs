//! Rule text persistence
//!
//! The engine only ever exchanges rule text with a store; parsed trees are
//! rebuilt on demand.

mod memory;

pub use memory::*;

use std::sync::Arc;

/// Named rule text storage
pub trait RuleStore: Send + Sync {
    /// Load the text stored under `name`
    fn load_text(&self, name: &str) -> Option<String>;

    /// Store `text` under `name`, replacing any previous text
    fn save_text(&self, name: &str, text: &str);

    fn exists(&self, name: &str) -> bool {
        self.load_text(name).is_some()
    }

    /// Stored rule names in sorted order
    fn names(&self) -> Vec<String>;
}

impl<S: RuleStore + ?Sized> RuleStore for Arc<S> {
    fn load_text(&self, name: &str) -> Option<String> {
        (**self).load_text(name)
    }

    fn save_text(&self, name: &str, text: &str) {
        (**self).save_text(name, text)
    }

    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }

    fn names(&self) -> Vec<String> {
        (**self).names()
    }
}
