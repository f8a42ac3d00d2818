//! Engine configuration structures

use crate::config::schema::{FieldSchema, DEFAULT_FIELDS};
use crate::error::{Result, RuleEngineError};
use crate::rule::{ParseOptions, DEFAULT_CACHE_CAPACITY};
use serde::Deserialize;

/// Rule engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Record fields rules may reference
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,
    /// Deepest parenthesis nesting accepted by the parser; unbounded if unset
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Parsed rule texts kept in memory
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_fields() -> Vec<String> {
    DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fields: default_fields(),
            max_depth: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(RuleEngineError::InvalidConfig(
                "fields must not be empty".to_string(),
            ));
        }
        if let Some(field) = self.fields.iter().find(|f| f.trim().is_empty()) {
            return Err(RuleEngineError::InvalidConfig(format!(
                "blank field name: '{}'",
                field
            )));
        }
        if self.max_depth == Some(0) {
            return Err(RuleEngineError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.cache_capacity == 0 {
            return Err(RuleEngineError::InvalidConfig(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn schema(&self) -> FieldSchema {
        FieldSchema::new(self.fields.iter().cloned())
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_depth: self.max_depth,
        }
    }
}
