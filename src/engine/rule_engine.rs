//! Named-rule operations over a rule store

use crate::config::{EngineConfig, FieldSchema};
use crate::error::{Result, RuleEngineError};
use crate::rule::{combine, evaluate, parse_with, render, LogicOp, Node, Record, RuleCache};
use crate::store::{MemoryRuleStore, RuleStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Name used when a rule is created without one
pub const DEFAULT_RULE_NAME: &str = "rule";

/// Name used when a combined rule is saved without one
pub const DEFAULT_COMBINED_RULE_NAME: &str = "combined_rule";

/// Result of combining stored rules
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRule {
    /// Name the combined text was saved under
    pub name: String,
    /// Flat-chained text, as stored
    pub text: String,
    /// Left-folded tree of the input rules
    pub tree: Node,
}

/// Rule engine holding named rules
///
/// Only rule text is persisted. Trees of stored rules are rebuilt through
/// the parse cache, so one engine can be shared across threads behind an
/// `Arc`. Ad hoc text is parsed on every call and never cached.
pub struct RuleEngine<S: RuleStore = MemoryRuleStore> {
    store: S,
    schema: FieldSchema,
    cache: RuleCache,
}

impl RuleEngine<MemoryRuleStore> {
    /// Create an engine with an empty in-memory store
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Self::with_store(config, MemoryRuleStore::new())
    }
}

impl Default for RuleEngine<MemoryRuleStore> {
    fn default() -> Self {
        Self::with_default_config(MemoryRuleStore::new())
    }
}

impl<S: RuleStore> RuleEngine<S> {
    /// Create an engine over an existing store
    pub fn with_store(config: &EngineConfig, store: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            schema: config.schema(),
            cache: RuleCache::with_capacity(config.parse_options(), config.cache_capacity),
        })
    }

    /// Create an engine over an existing store with the default schema
    pub fn with_default_config(store: S) -> Self {
        let config = EngineConfig::default();
        Self {
            store,
            schema: config.schema(),
            cache: RuleCache::with_capacity(config.parse_options(), config.cache_capacity),
        }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &RuleCache {
        &self.cache
    }

    /// Parse rule text without storing or caching it
    pub fn parse(&self, text: &str) -> Result<Node> {
        Ok(parse_with(text, self.cache.options())?)
    }

    /// Parse and store a rule; nothing is stored if parsing fails
    pub fn create_rule(&self, name: &str, text: &str) -> Result<Node> {
        let ast = self.cache.get_or_parse(text)?;
        self.store.save_text(name, text);
        info!(rule_name = name, "rule created");
        Ok(Node::clone(&ast))
    }

    /// Replace the text of an existing rule
    pub fn modify_rule(&self, name: &str, text: &str) -> Result<Node> {
        let Some(previous) = self.store.load_text(name) else {
            warn!(rule_name = name, "modify requested for unknown rule");
            return Err(RuleEngineError::RuleNotFound(name.to_string()));
        };

        let ast = self.cache.get_or_parse(text)?;
        self.store.save_text(name, text);
        if previous != text {
            self.cache.remove(&previous);
        }
        info!(rule_name = name, "rule modified");
        Ok(Node::clone(&ast))
    }

    pub fn rule_text(&self, name: &str) -> Result<String> {
        self.store.load_text(name).ok_or_else(|| {
            warn!(rule_name = name, "rule not found");
            RuleEngineError::RuleNotFound(name.to_string())
        })
    }

    pub fn contains_rule(&self, name: &str) -> bool {
        self.store.exists(name)
    }

    pub fn rule_names(&self) -> Vec<String> {
        self.store.names()
    }

    /// Evaluate an already built tree with this engine's schema
    pub fn evaluate(&self, tree: &Node, record: &Record) -> Result<bool> {
        Ok(evaluate(tree, record, &self.schema)?)
    }

    /// Evaluate ad hoc rule text
    pub fn evaluate_text(&self, text: &str, record: &Record) -> Result<bool> {
        let ast = self.parse(text)?;
        self.evaluate(&ast, record)
    }

    /// Load a stored rule and evaluate it
    pub fn evaluate_rule(&self, name: &str, record: &Record) -> Result<bool> {
        let text = self.rule_text(name)?;
        self.cache.check(&text, record, &self.schema)
    }

    /// Combine stored rules and save the result under `combined_name`
    ///
    /// Every name must exist before anything is combined or saved.
    pub fn combine_rules<N: AsRef<str>>(
        &self,
        names: &[N],
        op: LogicOp,
        combined_name: &str,
    ) -> Result<CombinedRule> {
        let texts = names
            .iter()
            .map(|name| self.rule_text(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let trees = texts
            .iter()
            .map(|text| -> Result<Node> { Ok(Node::clone(&*self.cache.get_or_parse(text)?)) })
            .collect::<Result<Vec<_>>>()?;
        let tree = combine(trees, op)?;

        let text = render(&texts, op);
        // The stored form must load again under this engine's limits
        self.cache.get_or_parse(&text)?;
        self.store.save_text(combined_name, &text);

        info!(
            rule_name = combined_name,
            operator = %op,
            inputs = names.len(),
            "rules combined"
        );

        Ok(CombinedRule {
            name: combined_name.to_string(),
            text,
            tree,
        })
    }
}

impl<S: RuleStore + 'static> RuleEngine<S> {
    /// Evaluate a stored rule on the blocking thread pool
    pub async fn evaluate_rule_async(self: Arc<Self>, name: String, record: Record) -> Result<bool> {
        tokio::task::spawn_blocking(move || self.evaluate_rule(&name, &record))
            .await
            .map_err(|e| RuleEngineError::Task(e.to_string()))?
    }
}
