//! Rule combination
//!
//! Trees are folded to the left and consumed; their texts are chained flat
//! so the stored form reparses into an equivalent tree.

use crate::error::CombineError;
use crate::rule::ast::{LogicOp, Node};

/// Fold rules into `(((r0 op r1) op r2) ... op rn)`
///
/// A single rule is returned unchanged.
pub fn combine<I>(rules: I, op: LogicOp) -> Result<Node, CombineError>
where
    I: IntoIterator<Item = Node>,
{
    let mut rules = rules.into_iter();
    let first = rules.next().ok_or(CombineError::EmptyRuleSet)?;

    Ok(rules.fold(first, |combined, rule| Node::operator(op, combined, rule)))
}

/// Render rule texts as `(T0) OP (T1) OP (T2)`
pub fn render<S: AsRef<str>>(texts: &[S], op: LogicOp) -> String {
    let separator = format!(" {} ", op);
    texts
        .iter()
        .map(|text| format!("({})", text.as_ref()))
        .collect::<Vec<_>>()
        .join(&separator)
}
