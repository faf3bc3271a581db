//! Routing error definitions.

use thiserror::Error;

/// Errors raised while normalizing or evaluating a notification policy tree.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A legacy matcher string could not be parsed.
    #[error("invalid matcher {input:?}: {reason}")]
    InvalidMatcher { input: String, reason: &'static str },

    /// A regex matcher value failed to compile.
    #[error("invalid regex for label {label:?}: {source}")]
    InvalidRegex {
        label: String,
        #[source]
        source: regex::Error,
    },

    /// Two routes in the same tree share an identifier.
    #[error("duplicate route id {0:?}")]
    DuplicateRouteId(String),
}

/// Convenience result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;
