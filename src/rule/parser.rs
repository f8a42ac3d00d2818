//! Recursive-descent rule parser
//!
//! Only structure is checked here. Field names, comparison operators and
//! literal types are left inside the operand text and validated by the
//! evaluator, so `(bonus > 100)` parses fine and fails later.

use crate::error::ParseError;
use crate::rule::ast::{LogicOp, Node};
use crate::rule::tokenizer::{tokenize, Token};
use std::iter::Peekable;
use std::vec::IntoIter;

/// Parser limits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest parenthesis nesting accepted; `None` means unbounded
    pub max_depth: Option<usize>,
}

/// Parse a rule string into an AST
pub fn parse(rule: &str) -> Result<Node, ParseError> {
    parse_with(rule, &ParseOptions::default())
}

/// Parse a rule string into an AST under the given limits
pub fn parse_with(rule: &str, options: &ParseOptions) -> Result<Node, ParseError> {
    let tokens = tokenize(rule);
    if tokens.is_empty() {
        return Err(ParseError::EmptyRule);
    }

    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        depth: 0,
        max_depth: options.max_depth,
    };
    let node = parser.parse_chain()?;

    match parser.tokens.next() {
        None => Ok(node),
        Some(Token::CloseParen) => Err(ParseError::UnexpectedToken(")".to_string())),
        Some(token) => Err(ParseError::MissingOperator {
            found: token.to_string(),
        }),
    }
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    depth: usize,
    max_depth: Option<usize>,
}

impl Parser {
    /// term (LOGIC_OP term)*, folded to the left
    fn parse_chain(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_term()?;
        let mut chain_op: Option<LogicOp> = None;

        while let Some(&Token::Logic(op)) = self.tokens.peek() {
            self.tokens.next();

            if let Some(first) = chain_op {
                if first != op {
                    return Err(ParseError::MixedOperators { first, second: op });
                }
            }
            chain_op = Some(op);

            match self.tokens.peek() {
                None | Some(Token::CloseParen) | Some(Token::Logic(_)) => {
                    return Err(ParseError::MissingRightOperand { operator: op });
                }
                Some(_) => {}
            }
            let right = self.parse_term()?;
            node = Node::operator(op, node, right);
        }

        Ok(node)
    }

    /// '(' chain ')' | operand
    fn parse_term(&mut self) -> Result<Node, ParseError> {
        match self.tokens.next() {
            // Only reachable right after an opening parenthesis
            None => Err(ParseError::MissingClosingParen),
            Some(Token::OpenParen) => {
                self.depth += 1;
                if let Some(limit) = self.max_depth {
                    if self.depth > limit {
                        return Err(ParseError::NestingTooDeep { limit });
                    }
                }

                let inner = self.parse_chain()?;
                match self.tokens.next() {
                    Some(Token::CloseParen) => {
                        self.depth -= 1;
                        Ok(inner)
                    }
                    None => Err(ParseError::MissingClosingParen),
                    // A logic keyword here was already taken by the chain
                    Some(token) => Err(ParseError::MissingOperator {
                        found: token.to_string(),
                    }),
                }
            }
            Some(Token::Word(field)) => self.parse_operand(field),
            Some(token) => Err(ParseError::UnexpectedToken(token.to_string())),
        }
    }

    /// FIELD OP VALUE, joined with single spaces
    fn parse_operand(&mut self, field: String) -> Result<Node, ParseError> {
        let operator = self.next_word();
        let literal = self.next_word();

        match (operator, literal) {
            (Some(operator), Some(literal)) => Ok(Node::operand(&field, &operator, &literal)),
            _ => Err(ParseError::MalformedOperand { token: field }),
        }
    }

    fn next_word(&mut self) -> Option<String> {
        match self.tokens.peek() {
            Some(Token::Word(_)) => match self.tokens.next() {
                Some(Token::Word(word)) => Some(word),
                _ => None,
            },
            _ => None,
        }
    }
}
