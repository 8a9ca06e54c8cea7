//! Error types for selector parsing and queries.

use thiserror::Error;

/// A selector string that cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing usable was left after separators and dropped tokens.
    #[error("selector {selector:?} contains no usable steps")]
    Empty {
        /// The selector as written.
        selector: String,
    },

    /// A chain was built from zero steps.
    #[error("a selector chain needs at least one step")]
    EmptyChain,

    /// `*` used as a tag without any attribute test.
    #[error("selector {selector:?}: a bare `*` must be combined with an attribute test")]
    BareWildcard {
        /// The selector as written.
        selector: String,
    },

    /// The bracketed attribute part could not be read.
    #[error("selector {selector:?} at offset {offset}: {reason}")]
    Malformed {
        /// The selector as written.
        selector: String,
        /// Character offset where reading failed.
        offset: usize,
        /// What was wrong.
        reason: String,
    },

    /// A `*=` pattern is not a valid regular expression.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The pattern after case folding.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors returned by [`Query`](crate::Query) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The selector could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// No node matched a single-result query (strict mode only).
    #[error("no node matches {selector:?}")]
    NotFound {
        /// The selector that found nothing.
        selector: String,
    },

    /// The node being queried has no children.
    #[error("nothing to search: the node has no children")]
    EmptyTree,
}
