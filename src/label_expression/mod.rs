//! Boolean label filters over string key/value label maps.
//!
//! Expressions combine `key=value` and `key!=value` comparisons with `!`,
//! `&` and `|` (tightest to loosest) and parentheses:
//!
//! ```text
//! expr    := orExpr
//! orExpr  := andExpr ('|' andExpr)*
//! andExpr := notExpr ('&' notExpr)*
//! notExpr := '!' notExpr | atom
//! atom    := '(' expr ')' | key '=' value | key '!=' value
//! ```
//!
//! A missing key never equals a value, so `key!=value` holds for entities
//! that lack `key` entirely. A blank expression matches everything.
//!
//! ```
//! use std::collections::BTreeMap;
//! use capability_router::label_expression::LabelExpression;
//!
//! let filter = LabelExpression::parse("(category=weather | category=news) & !action=forecast")
//!     .expect("valid expression");
//! let labels = BTreeMap::from([("category".to_owned(), "news".to_owned())]);
//! assert!(filter.matches(&labels));
//! ```

mod error;
mod lexer;
mod parser;


pub use error::{LabelExpressionError, LabelExpressionErrorReason};

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

/// Read access to an entity's labels.
pub trait LabelSource {
    /// Returns the value stored under `key`, if any.
    fn label(&self, key: &str) -> Option<&str>;
}

impl LabelSource for BTreeMap<String, String> {
    fn label(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl<S: BuildHasher> LabelSource for HashMap<String, String, S> {
    fn label(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LabelNode {
    Equals { key: String, value: String },
    NotEquals { key: String, value: String },
    Not(Box<Self>),
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
}

impl LabelNode {
    /// Negates the node, collapsing a double negation.
    fn negate(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    fn evaluate(&self, labels: &impl LabelSource) -> bool {
        match self {
            Self::Equals { key, value } => labels.label(key) == Some(value.as_str()),
            Self::NotEquals { key, value } => labels.label(key) != Some(value.as_str()),
            Self::Not(inner) => !inner.evaluate(labels),
            Self::And(left, right) => left.evaluate(labels) && right.evaluate(labels),
            Self::Or(left, right) => left.evaluate(labels) || right.evaluate(labels),
        }
    }
}

impl fmt::Display for LabelNode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { key, value } => write!(formatter, "{key}={value}"),
            Self::NotEquals { key, value } => write!(formatter, "{key}!={value}"),
            Self::Not(inner) => write!(formatter, "!({inner})"),
            Self::And(left, right) => write!(formatter, "({left} & {right})"),
            Self::Or(left, right) => write!(formatter, "({left} | {right})"),
        }
    }
}

/// A parsed, reusable label filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelExpression {
    source: String,
    root: Option<LabelNode>,
}

impl LabelExpression {
    /// Parses an expression.
    ///
    /// Blank input yields the identity filter.
    ///
    /// # Errors
    ///
    /// Returns [`LabelExpressionError`] naming the expression when it contains
    /// invalid characters, is too long, or is syntactically malformed.
    pub fn parse(expression: &str) -> Result<Self, LabelExpressionError> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Ok(Self::matches_all());
        }

        let tokens = lexer::tokenize(trimmed)
            .map_err(|reason| LabelExpressionError::new(expression, reason))?;
        let root = parser::parse_tokens(&tokens)
            .map_err(|reason| LabelExpressionError::new(expression, reason))?;

        Ok(Self {
            source: trimmed.to_owned(),
            root: Some(root),
        })
    }

    /// Parses an optional expression, treating `None` as the identity filter.
    ///
    /// # Errors
    ///
    /// Returns [`LabelExpressionError`] when a provided expression is invalid.
    pub fn parse_optional(expression: Option<&str>) -> Result<Self, LabelExpressionError> {
        expression.map_or_else(|| Ok(Self::matches_all()), Self::parse)
    }

    /// Returns a filter that accepts every entity.
    #[must_use]
    pub const fn matches_all() -> Self {
        Self {
            source: String::new(),
            root: None,
        }
    }

    /// Returns whether this filter accepts every entity.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the expression text as supplied (trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Evaluates the filter against a label map.
    #[must_use]
    pub fn matches(&self, labels: &impl LabelSource) -> bool {
        self.root
            .as_ref()
            .is_none_or(|root| root.evaluate(labels))
    }
}

impl fmt::Display for LabelExpression {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(formatter, "{root}"),
            None => formatter.write_str("*"),
        }
    }
}
