//! Expression evaluation services.
//!
//! [`ExpressionTree`] owns one compiled expression together with its
//! variable-binding table. It is a standalone arithmetic engine and is not
//! wired into cell formula resolution.

use tracing::{debug, instrument, warn};
use super::errors::{ExpressionError, ExpressionResult};
use super::parser::{Bindings, Node, Parser};

/// Evaluates `node` against `bindings`.
///
/// Division by zero follows IEEE 754 and is not an error.
///
/// # Errors
///
/// Returns [`ExpressionError::UnboundVariable`] when a variable in the tree
/// has no entry in `bindings`.
///
/// # Examples
///
/// ```
/// use cellgrid::domain::{evaluate, Bindings, Parser};
///
/// let tree = Parser::new("(a+1)*2").parse().unwrap().unwrap();
/// let mut bindings = Bindings::new();
/// bindings.insert("a".to_string(), 4.0);
/// assert_eq!(evaluate(&tree, &bindings), Ok(10.0));
/// ```
pub fn evaluate(node: &Node, bindings: &Bindings) -> ExpressionResult<f64> {
    match node {
        Node::Constant(value) => Ok(*value),
        Node::Variable(name) => bindings
            .get(name)
            .copied()
            .ok_or_else(|| ExpressionError::UnboundVariable(name.clone())),
        Node::Operator { operator, left, right } => {
            let left = evaluate(left, bindings)?;
            let right = evaluate(right, bindings)?;
            Ok(operator.apply(left, right))
        }
    }
}

/// A compiled arithmetic expression with its own variable bindings.
///
/// Compiling replaces the tree and rebuilds the binding table from scratch:
/// every variable in the new expression starts at 0, and values set for an
/// earlier expression are dropped even when a name is reused. A failed
/// compile leaves the previous expression, tree and bindings in place.
///
/// # Examples
///
/// ```
/// use cellgrid::domain::ExpressionTree;
///
/// let mut tree = ExpressionTree::new("x+5").unwrap();
/// tree.set_variable("x", 10.0).unwrap();
/// assert_eq!(tree.evaluate(), Ok(Some(15.0)));
///
/// tree.compile("x*2").unwrap();
/// assert_eq!(tree.evaluate(), Ok(Some(0.0)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExpressionTree {
    expression: String,
    root: Option<Node>,
    variables: Bindings,
}

impl ExpressionTree {
    /// Compiles `expression` into a new tree.
    pub fn new(expression: &str) -> ExpressionResult<Self> {
        let mut tree = Self::default();
        tree.compile(expression)?;
        Ok(tree)
    }

    /// Replaces the current expression with `expression`.
    ///
    /// Returns the new root, or `None` for an empty expression.
    #[instrument(level = "debug", skip(self))]
    pub fn compile(&mut self, expression: &str) -> ExpressionResult<Option<&Node>> {
        let mut parser = Parser::new(expression);
        let root = parser.parse()?;

        self.expression = expression.to_string();
        self.variables = parser.into_variables();
        self.root = root;
        debug!(variables = self.variables.len(), "compiled expression");
        Ok(self.root.as_ref())
    }

    /// Evaluates the compiled tree.
    ///
    /// Returns `Ok(None)` when the expression was empty, which is distinct
    /// from an expression whose value is zero.
    pub fn evaluate(&self) -> ExpressionResult<Option<f64>> {
        self.root
            .as_ref()
            .map(|root| evaluate(root, &self.variables))
            .transpose()
    }

    /// Binds `value` to a variable of the current expression and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::UnknownVariable`] when the current
    /// expression does not mention `name`.
    pub fn set_variable(&mut self, name: &str, value: f64) -> ExpressionResult<f64> {
        match self.variables.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(value)
            }
            None => {
                warn!(name, expression = %self.expression, "ignoring unknown variable");
                Err(ExpressionError::UnknownVariable(name.to_string()))
            }
        }
    }

    pub fn variable(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    /// Variable names of the current expression, sorted.
    pub fn variable_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.variables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Operator;

    fn eval(expression: &str) -> Option<f64> {
        ExpressionTree::new(expression).unwrap().evaluate().unwrap()
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(eval("2+3"), Some(5.0));
        assert_eq!(eval("7-10"), Some(-3.0));
        assert_eq!(eval("6*7"), Some(42.0));
        assert_eq!(eval("9/2"), Some(4.5));
    }

    #[test]
    fn test_precedence_and_parentheses() {
        assert_eq!(eval("2+3*4"), Some(14.0));
        assert_eq!(eval("(2+3)*4"), Some(20.0));
        assert_eq!(eval("2*(3+4)*5"), Some(70.0));
    }

    #[test]
    fn test_left_to_right_chains() {
        assert_eq!(eval("10-3-2"), Some(5.0));
        assert_eq!(eval("10-3+2"), Some(9.0));
        assert_eq!(eval("10+3-2"), Some(11.0));
        assert_eq!(eval("2-3+4-5"), Some(-2.0));
        assert_eq!(eval("100/10/5"), Some(2.0));
        assert_eq!(eval("8/4*2"), Some(4.0));
        assert_eq!(eval("8*4/2"), Some(16.0));
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        assert_eq!(eval("1/0"), Some(f64::INFINITY));
        assert_eq!(eval("0-1/0"), Some(f64::NEG_INFINITY));
        assert!(eval("0/0").unwrap().is_nan());
    }

    #[test]
    fn test_empty_expression_is_distinct_from_zero() {
        assert_eq!(eval(""), None);
        assert_eq!(eval("0"), Some(0.0));
        assert_eq!(ExpressionTree::default().evaluate(), Ok(None));
    }

    #[test]
    fn test_set_variable() {
        let mut tree = ExpressionTree::new("x+5").unwrap();
        assert_eq!(tree.evaluate(), Ok(Some(5.0)));
        assert_eq!(tree.set_variable("x", 10.0), Ok(10.0));
        assert_eq!(tree.evaluate(), Ok(Some(15.0)));
        assert_eq!(tree.variable("x"), Some(10.0));
    }

    #[test]
    fn test_set_unknown_variable_fails() {
        let mut tree = ExpressionTree::new("x+5").unwrap();
        assert_eq!(
            tree.set_variable("y", 1.0),
            Err(ExpressionError::UnknownVariable("y".to_string()))
        );
        assert_eq!(tree.variable("y"), None);
    }

    #[test]
    fn test_recompile_clears_bindings() {
        let mut tree = ExpressionTree::new("x+5").unwrap();
        tree.set_variable("x", 10.0).unwrap();

        tree.compile("x+1").unwrap();
        assert_eq!(tree.variable("x"), Some(0.0));
        assert_eq!(tree.evaluate(), Ok(Some(1.0)));

        tree.compile("y").unwrap();
        assert_eq!(tree.variable_names(), vec!["y"]);
        assert_eq!(
            tree.set_variable("x", 3.0),
            Err(ExpressionError::UnknownVariable("x".to_string()))
        );
    }

    #[test]
    fn test_failed_compile_keeps_previous_state() {
        let mut tree = ExpressionTree::new("x*2").unwrap();
        tree.set_variable("x", 4.0).unwrap();

        assert!(tree.compile("(x*2").is_err());
        assert_eq!(tree.expression(), "x*2");
        assert_eq!(tree.evaluate(), Ok(Some(8.0)));
    }

    #[test]
    fn test_variable_names_sorted() {
        let tree = ExpressionTree::new("zeta+alpha*mid").unwrap();
        assert_eq!(tree.variable_names(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_unbound_variable_in_free_evaluate() {
        let tree = Node::Operator {
            operator: Operator::Add,
            left: Box::new(Node::Constant(1.0)),
            right: Box::new(Node::Variable("missing".to_string())),
        };
        assert_eq!(
            evaluate(&tree, &Bindings::new()),
            Err(ExpressionError::UnboundVariable("missing".to_string()))
        );
    }

    #[test]
    fn test_errors_stay_local_in_batches() {
        let bindings: Bindings = [("a".to_string(), 2.0)].into_iter().collect();
        let trees = [
            Node::Variable("a".to_string()),
            Node::Variable("b".to_string()),
            Node::Constant(7.0),
        ];

        let results: Vec<_> = trees.iter().map(|tree| evaluate(tree, &bindings)).collect();
        assert_eq!(results[0], Ok(2.0));
        assert!(results[1].is_err());
        assert_eq!(results[2], Ok(7.0));
    }
}
