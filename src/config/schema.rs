//! Field schema consulted by the evaluator

use ahash::AHashSet;

/// Fields accepted when no schema is configured
pub const DEFAULT_FIELDS: [&str; 4] = ["age", "department", "salary", "experience"];

/// Closed set of record field names a rule may reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    fields: AHashSet<String>,
}

impl FieldSchema {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Sorted, comma separated field list for error messages
    pub fn describe(&self) -> String {
        self.names().join(", ")
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::new(DEFAULT_FIELDS)
    }
}
