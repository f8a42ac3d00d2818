//! Property tests for the rule module
//!
//! Covers the parse/render round trip, combination semantics, deferred
//! validation and the absence of short-circuiting.

use proptest::prelude::*;

use crate::config::{FieldSchema, DEFAULT_FIELDS};
use crate::error::EvalError;
use crate::rule::ast::{LogicOp, Node};
use crate::rule::combiner::{combine, render};
use crate::rule::evaluator::{evaluate, Record, Value};
use crate::rule::parser::parse;
use crate::rule::tokenizer::{tokenize, Token};

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators for property tests
// ═══════════════════════════════════════════════════════════════════════════

/// Schema fields, plus one field the default schema rejects
fn field_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        4 => prop::sample::select(DEFAULT_FIELDS.to_vec()),
        1 => Just("bonus"),
    ]
}

fn comparison_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(">"), Just("<"), Just("="), Just("!="),]
}

fn text_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("Sales"), Just("HR"), Just("IT"), Just("Marketing"),]
}

fn literal_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0..100i32).prop_map(|n| n.to_string()),
        text_strategy().prop_map(|s| format!("'{}'", s)),
    ]
}

fn logic_op_strategy() -> impl Strategy<Value = LogicOp> {
    prop_oneof![Just(LogicOp::And), Just(LogicOp::Or),]
}

/// A single "field op literal" comparison
fn operand_strategy() -> impl Strategy<Value = String> {
    (field_strategy(), comparison_strategy(), literal_strategy())
        .prop_map(|(field, op, literal)| format!("{} {} {}", field, op, literal))
}

/// Nested, fully parenthesized rule text
fn rule_strategy() -> impl Strategy<Value = String> {
    operand_strategy().prop_recursive(4, 16, 2, |inner| {
        (inner.clone(), logic_op_strategy(), inner)
            .prop_map(|(left, op, right)| format!("({} {} {})", left, op, right))
    })
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => (0..100i32).prop_map(Value::from),
        2 => text_strategy().prop_map(Value::from),
    ]
}

/// Records where every schema field may be absent
fn record_strategy() -> impl Strategy<Value = Record> {
    prop::collection::vec(prop::option::of(value_strategy()), DEFAULT_FIELDS.len()).prop_map(
        |values| {
            DEFAULT_FIELDS
                .iter()
                .zip(values)
                .filter_map(|(field, value)| value.map(|v| (field.to_string(), v)))
                .collect()
        },
    )
}

/// Left-to-right, fail-fast fold of already computed results
fn fold_results(results: Vec<Result<bool, EvalError>>, op: LogicOp) -> Result<bool, EvalError> {
    let values = results.into_iter().collect::<Result<Vec<bool>, _>>()?;
    Ok(match op {
        LogicOp::And => values.into_iter().all(|v| v),
        LogicOp::Or => values.into_iter().any(|v| v),
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// Generated rules are structurally valid
    #[test]
    fn prop_generated_rules_parse(rule in rule_strategy()) {
        let result = parse(&rule);
        prop_assert!(result.is_ok(), "Failed to parse: {}", rule);
    }

    /// Rendering a single rule and reparsing it yields the same tree
    #[test]
    fn prop_render_single_round_trip(
        rule in rule_strategy(),
        op in logic_op_strategy(),
        record in record_strategy()
    ) {
        let schema = FieldSchema::default();
        let original = parse(&rule).unwrap();
        let reparsed = parse(&render(&[rule.as_str()], op)).unwrap();

        prop_assert_eq!(&reparsed, &original);
        prop_assert_eq!(
            evaluate(&reparsed, &record, &schema),
            evaluate(&original, &record, &schema)
        );
    }

    /// Canonical display text reparses to the same tree
    #[test]
    fn prop_display_round_trip(rule in rule_strategy()) {
        let ast = parse(&rule).unwrap();
        prop_assert_eq!(parse(&ast.to_string()).unwrap(), ast);
    }

    /// Folding a single tree returns it unchanged
    #[test]
    fn prop_combine_singleton_is_identity(rule in rule_strategy(), op in logic_op_strategy()) {
        let ast = parse(&rule).unwrap();
        prop_assert_eq!(combine(vec![ast.clone()], op).unwrap(), ast);
    }

    /// The fold evaluates like the rules joined one after another
    #[test]
    fn prop_combine_matches_sequential_evaluation(
        rules in prop::collection::vec(rule_strategy(), 1..=4),
        op in logic_op_strategy(),
        record in record_strategy()
    ) {
        let schema = FieldSchema::default();
        let trees: Vec<Node> = rules.iter().map(|r| parse(r).unwrap()).collect();
        let expected = fold_results(
            trees.iter().map(|t| evaluate(t, &record, &schema)).collect(),
            op,
        );

        let combined = combine(trees, op).unwrap();
        prop_assert_eq!(evaluate(&combined, &record, &schema), expected);
    }

    /// The rendered text reloads into the tree the fold built
    #[test]
    fn prop_rendered_text_matches_combined_tree(
        rules in prop::collection::vec(rule_strategy(), 1..=4),
        op in logic_op_strategy(),
        record in record_strategy()
    ) {
        let schema = FieldSchema::default();
        let combined = combine(rules.iter().map(|r| parse(r).unwrap()), op).unwrap();
        let reparsed = parse(&render(&rules, op)).unwrap();

        prop_assert_eq!(&reparsed, &combined);
        prop_assert_eq!(
            evaluate(&reparsed, &record, &schema),
            evaluate(&combined, &record, &schema)
        );
    }

    /// The right side runs (and fails) whatever the left side returned
    #[test]
    fn prop_no_short_circuit(
        rule in rule_strategy(),
        op in logic_op_strategy(),
        record in record_strategy()
    ) {
        let guarded = format!("({}) {} (bonus > 1)", rule, op);
        let result = evaluate(&parse(&guarded).unwrap(), &record, &FieldSchema::default());
        prop_assert!(result.is_err(), "Expected an error for: {}", guarded);
    }

    /// Unknown fields parse, then fail at evaluation
    #[test]
    fn prop_unknown_field_is_deferred(
        op in comparison_strategy(),
        literal in literal_strategy(),
        record in record_strategy()
    ) {
        let rule = format!("(bonus {} {})", op, literal);
        let ast = parse(&rule).unwrap();
        let is_unknown_field = matches!(
            evaluate(&ast, &record, &FieldSchema::default()),
            Err(EvalError::UnknownField { .. })
        );
        prop_assert!(is_unknown_field);
    }

    /// Zero is a present value, not a missing one
    #[test]
    fn prop_zero_is_present(field in prop::sample::select(DEFAULT_FIELDS.to_vec())) {
        let mut record = Record::new();
        record.insert(field.to_string(), Value::from(0));
        let ast = parse(&format!("{} = 0", field)).unwrap();
        prop_assert_eq!(evaluate(&ast, &record, &FieldSchema::default()), Ok(true));
    }

    /// Numeric comparisons agree with f64 comparisons
    #[test]
    fn prop_numeric_comparisons(actual in 0..200i32, threshold in 0..200i32) {
        let schema = FieldSchema::default();
        let mut record = Record::new();
        record.insert("salary".to_string(), Value::from(actual));

        let check = |op: &str| evaluate(&parse(&format!("salary {} {}", op, threshold)).unwrap(), &record, &schema);
        prop_assert_eq!(check(">"), Ok(actual > threshold));
        prop_assert_eq!(check("<"), Ok(actual < threshold));
        prop_assert_eq!(check("="), Ok(actual == threshold));
        prop_assert_eq!(check("!="), Ok(actual != threshold));
    }

    /// Tokenizing never fails and never produces empty words
    #[test]
    fn prop_tokenizer_is_total(input in ".*") {
        for token in tokenize(&input) {
            if let Token::Word(word) = token {
                prop_assert!(!word.is_empty());
            }
        }
    }
}

#[test]
fn test_scenario_combine_then_render() {
    let texts = ["age > 18", "department = 'HR'"];
    let combined = combine(texts.iter().map(|t| parse(t).unwrap()), LogicOp::Or).unwrap();
    let rendered = render(&texts, LogicOp::Or);
    assert_eq!(rendered, "(age > 18) OR (department = 'HR')");
    assert_eq!(parse(&rendered).unwrap(), combined);
}
