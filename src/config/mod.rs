//! Configuration module for the rule engine
//!
//! Holds the field schema and engine settings. With the `python` feature the
//! configuration can also be read from a Python dict.

mod engine;
mod schema;

pub use engine::*;
pub use schema::*;

#[cfg(feature = "python")]
pub use python::deserialize_engine_config;

#[cfg(feature = "python")]
mod python {
    use super::EngineConfig;
    use pyo3::types::{PyAnyMethods, PyDict, PyDictMethods};
    use pyo3::Bound;

    /// Deserialize engine config from a Python dict
    /// Expected format: {"fields": [str, ...], "max_depth": int | None, "cache_capacity": int}
    pub fn deserialize_engine_config(
        config: &Bound<'_, PyDict>,
    ) -> pyo3::PyResult<EngineConfig> {
        let mut engine_config = EngineConfig::default();

        if let Some(fields) = config.get_item("fields")? {
            if !fields.is_none() {
                engine_config.fields = fields.extract()?;
            }
        }

        if let Some(depth) = config.get_item("max_depth")? {
            if !depth.is_none() {
                engine_config.max_depth = Some(depth.extract()?);
            }
        }

        if let Some(capacity) = config.get_item("cache_capacity")? {
            if !capacity.is_none() {
                engine_config.cache_capacity = capacity.extract()?;
            }
        }

        engine_config.validate()?;
        Ok(engine_config)
    }
}
