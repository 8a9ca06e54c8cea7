//! Selector engine for pluck.
//!
//! Finds elements in a [`pluck_dom::DomTree`] with a compact, CSS-like
//! selector language:
//!
//! | Selector            | Matches                                              |
//! |---------------------|------------------------------------------------------|
//! | `p`                 | `<p>` elements                                       |
//! | `#main`, `.note`    | id / class (class also matches a single class token) |
//! | `a[href]`           | `<a>` with an `href` attribute                       |
//! | `p[!id]`            | `<p>` without an `id` attribute                      |
//! | `a[href^=https]`    | prefix; also `$=` suffix, `!=` inequality            |
//! | `td[plaintext*=ok]` | regex search over the element's text                 |
//! | `ul li`, `ul/li`    | `<li>` whose **direct parent** is a `<ul>`           |
//! | `h1, h2`            | `<h1>` matches, then `<h2>` matches                  |
//!
//! Comparisons ignore case. Matches come back as a lazy iterator
//! ([`Query::all`]) or as a single node at a position ([`Query::one`]);
//! negative positions count from the end, and single-node queries stop
//! walking the tree as soon as the node is found.

/// Error types.
pub mod error;
/// Query entry points and node handles.
pub mod query;
/// Lazy tree search.
pub mod search;
/// Selector model, parser and step matching.
pub mod selector;

pub use error::{ParseError, QueryError};
pub use query::{Found, Matches, NodeRef, Query, QueryOptions};
pub use search::{MatchCursor, Search, chain_matches};
pub use selector::{
    ContainsPattern, Operator, SelectorChain, SelectorGroup, SelectorStep, TagFilter,
    parse_selector_group, step_matches,
};
