//! Compiler from arithmetic expression strings to expression trees.
//!
//! The compiler works directly on the source text without a tokenizing pass.
//! Each call looks for an operator to split on, compiles both halves and
//! builds an [`Node::Operator`] from them. When nothing splits, the text is a
//! leaf: an integer constant or a variable name.
//!
//! # Grammar
//!
//! ```bnf
//! Expression ::= Expression ( "+" | "-" | "*" | "/" ) Expression
//!              | "(" Expression ")"
//!              | Integer
//!              | Variable
//! Integer    ::= [0-9]+
//! Variable   ::= [A-Za-z_][A-Za-z0-9_]*
//! ```
//!
//! # Precedence
//!
//! Operators are tried in the order `+`, `-`, `*`, `/`, and each one is
//! searched for from the right end of the text, outside any parentheses. The
//! first operator found becomes the root of the tree and is therefore applied
//! last, so `+`/`-` bind looser than `*`/`/` and equal-precedence chains
//! group from the left.
//!
//! Because `+` is tried before `-` (and `*` before `/`) regardless of which
//! is rightmost, `10-3+2` compiles as `(10-3)+2` but `10+3-2` compiles as
//! `10+(3-2)`. Both groupings give the left-to-right result for finite
//! values. They may differ when an intermediate division by zero produces an
//! infinity or NaN in one grouping and not in the other.
//!
//! Unary operators are not supported: `-5` fails with
//! [`ExpressionError::MissingOperand`].

use std::collections::HashMap;
use tracing::trace;
use super::errors::{ExpressionError, ExpressionResult};

/// Maximum nesting of parentheses and operator splits accepted by [`Parser`].
pub const MAX_DEPTH: usize = 256;

/// Variable-binding table: variable name to its current value.
pub type Bindings = HashMap<String, f64>;

/// The four binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Order in which the compiler searches for a split point.
    pub const SPLIT_ORDER: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    /// Applies the operator with IEEE 754 semantics; dividing by zero yields
    /// an infinity or NaN rather than an error.
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
            Operator::Divide => left / right,
        }
    }
}

/// A node of a compiled expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(f64),
    /// Looked up by name in a [`Bindings`] table at evaluation time.
    Variable(String),
    Operator {
        operator: Operator,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    /// Number of levels from this node down to its deepest leaf, counting
    /// this node.
    pub fn depth(&self) -> usize {
        match self {
            Node::Constant(_) | Node::Variable(_) => 1,
            Node::Operator { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Compiles one expression string and collects the variables it names.
///
/// # Examples
///
/// ```
/// use cellgrid::domain::{Node, Operator, Parser};
///
/// let mut parser = Parser::new("x*2");
/// let tree = parser.parse().unwrap().unwrap();
/// assert!(matches!(tree, Node::Operator { operator: Operator::Multiply, .. }));
/// assert_eq!(parser.into_variables().get("x"), Some(&0.0));
/// ```
pub struct Parser<'a> {
    source: &'a str,
    variables: Bindings,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            variables: Bindings::new(),
        }
    }

    /// Compiles the source text.
    ///
    /// Returns `Ok(None)` when the text is empty or only whitespace.
    pub fn parse(&mut self) -> ExpressionResult<Option<Node>> {
        let source = self.source.trim();
        if source.is_empty() {
            return Ok(None);
        }

        check_balanced(source)?;
        self.parse_expression(source, 0).map(Some)
    }

    /// Consumes the parser, returning every variable found, each seeded to 0.
    pub fn into_variables(self) -> Bindings {
        self.variables
    }

    fn parse_expression(&mut self, expression: &str, depth: usize) -> ExpressionResult<Node> {
        if depth > MAX_DEPTH {
            return Err(ExpressionError::TooDeep(MAX_DEPTH));
        }

        let expression = expression.trim();
        if expression.is_empty() {
            return Err(ExpressionError::MissingOperand(self.source.to_string()));
        }

        if let Some(inner) = strip_enclosing_parens(expression) {
            trace!(expression, "stripping enclosing parentheses");
            return self.parse_expression(inner, depth + 1);
        }

        for operator in Operator::SPLIT_ORDER {
            if let Some(index) = find_split(expression, operator.symbol()) {
                trace!(expression, index, symbol = %operator.symbol(), "splitting");
                let left = self.parse_expression(&expression[..index], depth + 1)?;
                let right = self.parse_expression(&expression[index + 1..], depth + 1)?;
                return Ok(Node::Operator {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                });
            }
        }

        self.parse_leaf(expression)
    }

    fn parse_leaf(&mut self, leaf: &str) -> ExpressionResult<Node> {
        if leaf.bytes().all(|b| b.is_ascii_digit()) {
            let value = leaf
                .parse::<f64>()
                .map_err(|_| ExpressionError::InvalidOperand(leaf.to_string()))?;
            return Ok(Node::Constant(value));
        }

        if is_variable_name(leaf) {
            self.variables.entry(leaf.to_string()).or_insert(0.0);
            return Ok(Node::Variable(leaf.to_string()));
        }

        Err(ExpressionError::InvalidOperand(leaf.to_string()))
    }
}

fn check_balanced(expression: &str) -> ExpressionResult<()> {
    let mut depth = 0usize;
    for ch in expression.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ExpressionError::UnbalancedParentheses(expression.to_string()))?;
            }
            _ => {}
        }
    }

    if depth == 0 {
        Ok(())
    } else {
        Err(ExpressionError::UnbalancedParentheses(expression.to_string()))
    }
}

/// Returns the inside of `expression` when a single pair of parentheses
/// wraps all of it, as in `(1+2)` but not `(1)+(2)`.
fn strip_enclosing_parens(expression: &str) -> Option<&str> {
    if !expression.starts_with('(') {
        return None;
    }

    let mut depth = 0usize;
    for (index, ch) in expression.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (index == expression.len() - 1).then(|| &expression[1..index]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte index of the rightmost `symbol` outside parentheses.
fn find_split(expression: &str, symbol: char) -> Option<usize> {
    let mut depth = 0isize;
    for (index, ch) in expression.char_indices().rev() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if ch == symbol && depth == 0 => return Some(index),
            _ => {}
        }
    }
    None
}

fn is_variable_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        _ => false,
    }
}
