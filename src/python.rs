//! Python bindings via PyO3
//!
//! Exposes the rule engine as the `eligibility_rules_core` module. One
//! process-wide engine serves every call; `init_config` swaps its schema
//! and limits while keeping the stored rules.

use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyString};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config;
use crate::engine::{RuleEngine, DEFAULT_COMBINED_RULE_NAME, DEFAULT_RULE_NAME};
use crate::error::RuleEngineError;
use crate::logging::{self, LoggingConfig};
use crate::rule::{record_from_optional, render, LogicOp, Node, Record, Value};
use crate::store::MemoryRuleStore;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

type SharedEngine = Arc<RuleEngine<Arc<MemoryRuleStore>>>;

// ============================================================================
// Cached Engine
// ============================================================================

/// Rule texts survive re-configuration
static STORE: Lazy<Arc<MemoryRuleStore>> = Lazy::new(|| Arc::new(MemoryRuleStore::new()));

/// Engine serving all calls, built from the default config until `init_config`
static ENGINE: Lazy<RwLock<SharedEngine>> = Lazy::new(|| {
    RwLock::new(Arc::new(RuleEngine::with_default_config(Arc::clone(&STORE))))
});

static CONFIGURED: AtomicBool = AtomicBool::new(false);

fn engine() -> SharedEngine {
    Arc::clone(&ENGINE.read())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Deserialize a record from a Python dict of str -> float | str | None
///
/// `None` values are left out, so rules on them fail as missing fields.
fn deserialize_record(data: &Bound<'_, PyDict>) -> PyResult<Record> {
    let mut pairs = Vec::with_capacity(data.len());
    for (key, value) in data.iter() {
        let field: String = key.extract()?;
        let value = if value.is_none() {
            None
        } else if value.is_instance_of::<PyString>() {
            Some(Value::Text(value.extract()?))
        } else if let Ok(number) = value.extract::<f64>() {
            Some(Value::Number(number))
        } else {
            return Err(PyTypeError::new_err(format!(
                "Field '{}' must be a number, a string or None",
                field
            )));
        };
        pairs.push((field, value));
    }
    Ok(record_from_optional(pairs))
}

fn parse_operator(operator: &str) -> PyResult<LogicOp> {
    operator
        .parse::<LogicOp>()
        .map_err(|e| RuleEngineError::from(e).into())
}

/// Convert an AST into the {node_type, value, left, right} dict shape
fn node_to_dict<'py>(py: Python<'py>, node: &Node) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    match node {
        Node::Operand { expression } => {
            dict.set_item("node_type", "operand")?;
            dict.set_item("value", expression)?;
            dict.set_item("left", py.None())?;
            dict.set_item("right", py.None())?;
        }
        Node::Operator { op, left, right } => {
            dict.set_item("node_type", "operator")?;
            dict.set_item("value", op.as_str())?;
            dict.set_item("left", node_to_dict(py, left)?)?;
            dict.set_item("right", node_to_dict(py, right)?)?;
        }
    }
    Ok(dict)
}

// ============================================================================
// Python Functions
// ============================================================================

/// Configure the field schema, parser limits and cache size
///
/// # Arguments
/// * `config` - {"fields": [str, ...], "max_depth": int | None, "cache_capacity": int}
#[pyfunction]
fn init_config(config: &Bound<'_, PyDict>) -> PyResult<()> {
    let engine_config = config::deserialize_engine_config(config)?;
    let engine = RuleEngine::with_store(&engine_config, Arc::clone(&STORE))?;

    *ENGINE.write() = Arc::new(engine);
    CONFIGURED.store(true, Ordering::Release);
    Ok(())
}

/// Check if `init_config` has been called
#[pyfunction]
fn is_config_initialized() -> bool {
    CONFIGURED.load(Ordering::Acquire)
}

/// Install a log subscriber printing engine events
#[pyfunction]
#[pyo3(signature = (level="info", json=false))]
fn init_logging(level: &str, json: bool) -> PyResult<()> {
    let config = LoggingConfig {
        level: level.to_string(),
        json,
    };
    Ok(logging::init(&config)?)
}

/// Parse a rule string and return its AST without storing it
#[pyfunction]
fn parse_rule(py: Python<'_>, rule_string: &str) -> PyResult<Py<PyAny>> {
    let ast = engine().parse(rule_string)?;
    Ok(node_to_dict(py, &ast)?.into_any().unbind())
}

/// Render rule strings as "(T0) OP (T1) ..."
#[pyfunction]
#[pyo3(signature = (rule_strings, operator="AND"))]
fn render_rules(rule_strings: Vec<String>, operator: &str) -> PyResult<String> {
    Ok(render(&rule_strings, parse_operator(operator)?))
}

/// Parse and store a rule
///
/// # Returns
/// {"rule_name": str, "ast": dict}
#[pyfunction]
#[pyo3(signature = (rule_string, rule_name=DEFAULT_RULE_NAME))]
fn create_rule(py: Python<'_>, rule_string: &str, rule_name: &str) -> PyResult<Py<PyAny>> {
    let ast = engine().create_rule(rule_name, rule_string)?;

    let dict = PyDict::new(py);
    dict.set_item("rule_name", rule_name)?;
    dict.set_item("ast", node_to_dict(py, &ast)?)?;
    Ok(dict.into_any().unbind())
}

/// Replace the text of an existing rule
///
/// # Raises
/// KeyError if the rule does not exist
#[pyfunction]
fn modify_rule(py: Python<'_>, rule_name: &str, new_rule_string: &str) -> PyResult<Py<PyAny>> {
    let ast = engine().modify_rule(rule_name, new_rule_string)?;
    Ok(node_to_dict(py, &ast)?.into_any().unbind())
}

/// Get the stored text of a rule
#[pyfunction]
fn get_rule(rule_name: &str) -> PyResult<String> {
    Ok(engine().rule_text(rule_name)?)
}

/// Evaluate a stored rule against a data dict
#[pyfunction]
fn evaluate_rule(rule_name: &str, data: &Bound<'_, PyDict>) -> PyResult<bool> {
    let record = deserialize_record(data)?;
    Ok(engine().evaluate_rule(rule_name, &record)?)
}

/// Evaluate a rule string directly, without storing it
#[pyfunction]
fn evaluate_expression(rule_string: &str, data: &Bound<'_, PyDict>) -> PyResult<bool> {
    let record = deserialize_record(data)?;
    Ok(engine().evaluate_text(rule_string, &record)?)
}

/// Evaluate a stored rule asynchronously
///
/// # Returns
/// A Python awaitable resolving to a bool
///
/// # Example (Python)
/// ```python
/// eligible = await evaluate_rule_async("sales", {"age": 35, "department": "Sales"})
/// ```
#[pyfunction]
fn evaluate_rule_async<'py>(
    py: Python<'py>,
    rule_name: String,
    data: &Bound<'py, PyDict>,
) -> PyResult<Bound<'py, PyAny>> {
    let record = deserialize_record(data)?;
    let engine = engine();

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        Ok(engine.evaluate_rule_async(rule_name, record).await?)
    })
}

/// Combine stored rules into a new stored rule
///
/// # Returns
/// {"rule_name": str, "rule_string": str, "combined_ast": dict}
#[pyfunction]
#[pyo3(signature = (rule_names, operator="AND", combined_rule_name=DEFAULT_COMBINED_RULE_NAME))]
fn combine_rules(
    py: Python<'_>,
    rule_names: Vec<String>,
    operator: &str,
    combined_rule_name: &str,
) -> PyResult<Py<PyAny>> {
    let op = parse_operator(operator)?;
    let combined = engine().combine_rules(&rule_names, op, combined_rule_name)?;

    let dict = PyDict::new(py);
    dict.set_item("rule_name", &combined.name)?;
    dict.set_item("rule_string", &combined.text)?;
    dict.set_item("combined_ast", node_to_dict(py, &combined.tree)?)?;
    Ok(dict.into_any().unbind())
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[pymodule]
fn eligibility_rules_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(init_config, m)?)?;
    m.add_function(wrap_pyfunction!(is_config_initialized, m)?)?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    m.add_function(wrap_pyfunction!(parse_rule, m)?)?;
    m.add_function(wrap_pyfunction!(render_rules, m)?)?;
    m.add_function(wrap_pyfunction!(create_rule, m)?)?;
    m.add_function(wrap_pyfunction!(modify_rule, m)?)?;
    m.add_function(wrap_pyfunction!(get_rule, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_rule, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_expression, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_rule_async, m)?)?;
    m.add_function(wrap_pyfunction!(combine_rules, m)?)?;
    Ok(())
}
