//! Parsed rule cache keyed by rule text

use crate::config::FieldSchema;
use crate::error::{ParseError, RuleEngineError};
use crate::rule::ast::Node;
use crate::rule::evaluator::{evaluate, Record};
use crate::rule::parser::{parse_with, ParseOptions};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Entries kept before the cache starts over
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Cache of parsed trees, shared read-only between evaluations
///
/// Holds at most `capacity` texts; inserting into a full cache clears it
/// first.
#[derive(Debug)]
pub struct RuleCache {
    entries: RwLock<AHashMap<String, Arc<Node>>>,
    options: ParseOptions,
    capacity: usize,
}

impl Default for RuleCache {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

impl RuleCache {
    pub fn new(options: ParseOptions) -> Self {
        Self::with_capacity(options, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(options: ParseOptions, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(AHashMap::with_capacity(capacity.min(256))),
            options,
            capacity,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get or parse a rule text; failed parses are not cached
    #[inline]
    pub fn get_or_parse(&self, rule: &str) -> Result<Arc<Node>, ParseError> {
        // Fast path: check read lock first
        {
            let entries = self.entries.read();
            if let Some(ast) = entries.get(rule) {
                return Ok(Arc::clone(ast));
            }
        }

        // Slow path: parse and cache
        tracing::debug!(rule, "parse cache miss");
        let ast = Arc::new(parse_with(rule, &self.options)?);

        let mut entries = self.entries.write();
        if entries.len() >= self.capacity && !entries.contains_key(rule) {
            tracing::debug!(capacity = self.capacity, "parse cache full, clearing");
            entries.clear();
        }
        let cached = entries
            .entry(rule.to_string())
            .or_insert_with(|| Arc::clone(&ast));
        Ok(Arc::clone(cached))
    }

    /// Parse (or reuse) a rule text and evaluate it against a record
    pub fn check(
        &self,
        rule: &str,
        record: &Record,
        schema: &FieldSchema,
    ) -> Result<bool, RuleEngineError> {
        let ast = self.get_or_parse(rule)?;
        Ok(evaluate(&ast, record, schema)?)
    }

    /// Drop one text, e.g. after the rule using it was replaced
    pub fn remove(&self, rule: &str) {
        self.entries.write().remove(rule);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
