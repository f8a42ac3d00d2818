//! Abstract Syntax Tree for eligibility rules

use crate::error::CombineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// AST node for rule expressions
///
/// Children are exclusively owned; a tree is never shared between two parents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_type", rename_all = "lowercase")]
pub enum Node {
    /// Single comparison like "age > 30", kept unparsed until evaluation
    Operand {
        #[serde(rename = "value")]
        expression: String,
    },
    /// Logical combination of two subtrees
    Operator {
        #[serde(rename = "value")]
        op: LogicOp,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Logical operators joining two subtrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicOp {
    /// Both sides must hold (AND)
    And,
    /// Either side must hold (OR)
    Or,
}

impl Node {
    /// Build an operand from its field, operator and literal tokens
    pub fn operand(field: &str, operator: &str, literal: &str) -> Self {
        Node::Operand {
            expression: format!("{} {} {}", field, operator, literal),
        }
    }

    /// Build an operator node taking ownership of both children
    pub fn operator(op: LogicOp, left: Node, right: Node) -> Self {
        Node::Operator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_operand(&self) -> bool {
        matches!(self, Node::Operand { .. })
    }

    /// Height of the tree; a lone operand has depth 1
    pub fn depth(&self) -> usize {
        match self {
            Node::Operand { .. } => 1,
            Node::Operator { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Operand expressions in left-to-right order
    pub fn operands(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_operands(&mut out);
        out
    }

    fn collect_operands<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Operand { expression } => out.push(expression),
            Node::Operator { left, right, .. } => {
                left.collect_operands(out);
                right.collect_operands(out);
            }
        }
    }

    /// Serialize to the `node_type`/`value`/`left`/`right` JSON shape
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Fully parenthesized rule text that reparses to an equal tree
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Operand { expression } => f.write_str(expression),
            Node::Operator { op, left, right } => write!(f, "({} {} {})", left, op, right),
        }
    }
}

impl LogicOp {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicOp::And => "AND",
            LogicOp::Or => "OR",
        }
    }

    /// Apply the operator to two already evaluated sides
    #[inline]
    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            LogicOp::And => left && right,
            LogicOp::Or => left || right,
        }
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicOp {
    type Err = CombineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(LogicOp::And),
            "OR" => Ok(LogicOp::Or),
            other => Err(CombineError::UnknownOperator(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::operator(
            LogicOp::And,
            Node::operand("age", ">", "30"),
            Node::operator(
                LogicOp::Or,
                Node::operand("department", "=", "'Sales'"),
                Node::operand("salary", "<", "5000"),
            ),
        )
    }

    #[test]
    fn test_display_is_fully_parenthesized() {
        assert_eq!(
            sample().to_string(),
            "(age > 30 AND (department = 'Sales' OR salary < 5000))"
        );
    }

    #[test]
    fn test_depth_and_operands() {
        let node = sample();
        assert_eq!(node.depth(), 3);
        assert_eq!(
            node.operands(),
            vec!["age > 30", "department = 'Sales'", "salary < 5000"]
        );
        assert!(Node::operand("age", ">", "1").is_operand());
    }

    #[test]
    fn test_json_shape() {
        let node = Node::operator(
            LogicOp::Or,
            Node::operand("age", ">", "18"),
            Node::operand("department", "=", "'HR'"),
        );
        let value: serde_json::Value = serde_json::from_str(&node.to_json().unwrap()).unwrap();

        assert_eq!(value["node_type"], "operator");
        assert_eq!(value["value"], "OR");
        assert_eq!(value["left"]["node_type"], "operand");
        assert_eq!(value["left"]["value"], "age > 18");
        assert_eq!(value["right"]["value"], "department = 'HR'");

        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_logic_op_from_str() {
        assert_eq!("AND".parse::<LogicOp>().unwrap(), LogicOp::And);
        assert_eq!("OR".parse::<LogicOp>().unwrap(), LogicOp::Or);
        assert_eq!(
            "XOR".parse::<LogicOp>(),
            Err(CombineError::UnknownOperator("XOR".to_string()))
        );
        // Keywords are case sensitive, like the tokenizer
        assert!("and".parse::<LogicOp>().is_err());
    }

    #[test]
    fn test_apply_truth_table() {
        assert!(LogicOp::And.apply(true, true));
        assert!(!LogicOp::And.apply(true, false));
        assert!(LogicOp::Or.apply(false, true));
        assert!(!LogicOp::Or.apply(false, false));
    }
}
