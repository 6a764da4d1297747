//! Error types for label expression parsing.

use thiserror::Error;

/// Reason a label expression was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LabelExpressionErrorReason {
    /// The expression exceeds the maximum accepted length.
    #[error("expression too long (max {max} characters)")]
    TooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// The expression contains a character outside the accepted set.
    #[error("unexpected character '{0}' in label expression")]
    InvalidCharacter(char),

    /// A token appeared where the grammar does not allow it.
    #[error("{expected} but got '{found}'")]
    UnexpectedToken {
        /// What the parser was looking for.
        expected: &'static str,
        /// The token actually found.
        found: String,
    },

    /// Input ended while the parser still expected a token.
    #[error("{expected} (end of input)")]
    UnexpectedEnd {
        /// What the parser was looking for.
        expected: &'static str,
    },

    /// Tokens remained after a complete expression was parsed.
    #[error("unexpected token after expression: '{0}'")]
    TrailingToken(String),
}

/// Error returned when a label expression cannot be parsed.
///
/// The offending expression text is always carried so callers can report it
/// verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid label expression '{expression}': {reason}")]
pub struct LabelExpressionError {
    expression: String,
    reason: LabelExpressionErrorReason,
}

impl LabelExpressionError {
    pub(super) fn new(expression: impl Into<String>, reason: LabelExpressionErrorReason) -> Self {
        Self {
            expression: expression.into(),
            reason,
        }
    }

    /// Returns the expression text that failed to parse.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Returns the parse failure reason.
    #[must_use]
    pub const fn reason(&self) -> &LabelExpressionErrorReason {
        &self.reason
    }
}
