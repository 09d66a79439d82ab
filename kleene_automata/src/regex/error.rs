use thiserror::Error;

use crate::loc::Span;

/// Why a regex could not be parsed.
/// A syntax error aborts the compilation of that one expression only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unbalanced parenthesis at {span}")]
    UnbalancedParenthesis { span: Span },
    #[error("operator '{op}' at {span} is missing an operand")]
    MissingOperand { op: char, span: Span },
    #[error("malformed character class at {span}: {reason}")]
    MalformedClass { reason: &'static str, span: Span },
    #[error("malformed expression at {span}: {reason}")]
    MalformedExpression { reason: &'static str, span: Span },
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::UnbalancedParenthesis { span } => *span,
            SyntaxError::MissingOperand { span, .. } => *span,
            SyntaxError::MalformedClass { span, .. } => *span,
            SyntaxError::MalformedExpression { span, .. } => *span,
        }
    }

    /// One-line description without the location
    pub fn summarize(&self) -> String {
        match self {
            SyntaxError::UnbalancedParenthesis { .. } => "Unbalanced parenthesis".to_string(),
            SyntaxError::MissingOperand { op, .. } => format!("Missing operand for {}", op),
            SyntaxError::MalformedClass { reason, .. } => format!("Malformed class, {}", reason),
            SyntaxError::MalformedExpression { reason, .. } => format!("Malformed expression, {}", reason),
        }
    }
}
