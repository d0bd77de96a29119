use thiserror::Error;

/// Failures raised while compiling or evaluating an arithmetic expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("unbalanced parentheses in: {0}")]
    UnbalancedParentheses(String),

    #[error("missing operand in: {0}")]
    MissingOperand(String),

    #[error("not a number or variable name: {0}")]
    InvalidOperand(String),

    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),

    #[error("variable was not registered by the current expression: {0}")]
    UnknownVariable(String),

    #[error("no value bound for variable: {0}")]
    UnboundVariable(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid cell reference: {0}")]
    InvalidCellReference(String),

    #[error(transparent)]
    Expression(#[from] ExpressionError),
}

pub type DomainResult<T> = Result<T, DomainError>;

pub type ExpressionResult<T> = Result<T, ExpressionError>;
