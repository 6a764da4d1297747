//! Cross-cutting error taxonomy.

use std::fmt;

/// Coarse classification shared by every service-level error.
///
/// Boundaries translate errors into responses by kind rather than by
/// concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No registered target or entity matches the request.
    NotFound,
    /// The resolved backend could not be reached or failed at transport
    /// level.
    Unavailable,
    /// A named entity with the same name is already registered.
    AlreadyExists,
    /// A label filter failed to parse.
    InvalidExpression,
    /// A required argument or property value is missing.
    MalformedRequest,
    /// Any other failure, such as storage errors.
    Internal,
}

impl ErrorKind {
    /// Returns a stable identifier for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unavailable => "unavailable",
            Self::AlreadyExists => "already_exists",
            Self::InvalidExpression => "invalid_expression",
            Self::MalformedRequest => "malformed_request",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
