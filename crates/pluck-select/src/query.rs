//! Query entry points: `all`, `one`, `first`, `end` and `find`.

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;

use pluck_dom::{DomTree, ElementData, NodeId};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::search::{MatchCursor, Search};
use crate::selector::{PLAINTEXT, parse_selector_group};

/// Query behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// When `true`, single-result queries that find nothing return
    /// [`QueryError::NotFound`]; otherwise they return `Ok(None)` /
    /// [`Found::Nothing`].
    pub strict: bool,
}

/// A borrowed handle to one node of a tree.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// Handle for `id` in `tree`.
    #[must_use]
    pub const fn new(tree: &'a DomTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// Handle for the document node of `tree`.
    #[must_use]
    pub const fn root(tree: &'a DomTree) -> Self {
        Self::new(tree, NodeId::ROOT)
    }

    /// The node's id.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The tree the node belongs to.
    #[must_use]
    pub const fn tree(&self) -> &'a DomTree {
        self.tree
    }

    /// Element data, if the node is an element.
    #[must_use]
    pub fn element(&self) -> Option<&'a ElementData> {
        self.tree.as_element(self.id)
    }

    /// The element's tag name.
    #[must_use]
    pub fn tag_name(&self) -> Option<&'a str> {
        self.element().map(|e| e.tag_name.as_str())
    }

    /// Value of the attribute called `name`.
    ///
    /// `plaintext` is not special here; use [`NodeRef::plain_text`].
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element().and_then(|e| e.attrs.get(name))
    }

    /// The `href` attribute.
    #[must_use]
    pub fn href(&self) -> Option<&'a str> {
        self.attr("href")
    }

    /// The `src` attribute.
    #[must_use]
    pub fn src(&self) -> Option<&'a str> {
        self.attr("src")
    }

    /// The concatenated text below this node (what `[plaintext=...]` compares).
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.tree.text_content(self.id)
    }

    /// Value of `name`, treating `plaintext` as the node's text.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<String> {
        if name.eq_ignore_ascii_case(PLAINTEXT) {
            Some(self.plain_text())
        } else {
            self.attr(name).map(str::to_string)
        }
    }

    /// The parent node.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.tree.parent(self.id).map(|id| Self::new(self.tree, id))
    }

    /// Query the subtree below this node with default options.
    #[must_use]
    pub const fn query(self) -> Query<'a> {
        Query::at(self)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag_name() {
            Some(tag) => write!(f, "NodeRef({}, <{tag}>)", self.id.0),
            None => write!(f, "NodeRef({})", self.id.0),
        }
    }
}

/// Lazily produced matches of an [`all`](Query::all) query.
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    search: Search<'a>,
}

impl Matches<'_> {
    /// Number of nodes the traversal has visited so far.
    #[must_use]
    pub const fn visited(&self) -> usize {
        self.search.visited()
    }
}

impl<'a> Iterator for Matches<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<NodeRef<'a>> {
        let tree = self.search.tree();
        self.search.next().map(|id| NodeRef::new(tree, id))
    }
}

impl FusedIterator for Matches<'_> {}

/// Result of [`find`](Query::find).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found<'a> {
    /// Every match, in traversal order (no index given).
    All(Vec<NodeRef<'a>>),
    /// The match at the requested index.
    One(NodeRef<'a>),
    /// Nothing matched (non-strict mode only).
    Nothing,
}

impl<'a> Found<'a> {
    /// The matches as a list, empty for [`Found::Nothing`].
    #[must_use]
    pub fn into_vec(self) -> Vec<NodeRef<'a>> {
        match self {
            Self::All(nodes) => nodes,
            Self::One(node) => vec![node],
            Self::Nothing => Vec::new(),
        }
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::All(nodes) => nodes.is_empty(),
            Self::One(_) => false,
            Self::Nothing => true,
        }
    }
}

/// Runs selectors against the subtree below one node.
///
/// ```ignore
/// let tree = pluck_html::load_str("<ul><li>a</li><li>b</li></ul>")?;
/// let query = Query::new(&tree);
/// assert_eq!(query.end("li")?.map(|n| n.plain_text()), Some("b".to_string()));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    node: NodeRef<'a>,
    options: QueryOptions,
}

impl<'a> Query<'a> {
    /// Query a whole tree with default options.
    #[must_use]
    pub const fn new(tree: &'a DomTree) -> Self {
        Self::at(NodeRef::root(tree))
    }

    /// Query the subtree below `node` with default options.
    #[must_use]
    pub const fn at(node: NodeRef<'a>) -> Self {
        Self {
            node,
            options: QueryOptions { strict: false },
        }
    }

    /// Replace the options.
    #[must_use]
    pub const fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    /// Turn strict mode on or off.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    /// The options in effect.
    #[must_use]
    pub const fn options(&self) -> QueryOptions {
        self.options
    }

    fn search(&self, selector: &str, cursor: MatchCursor) -> Result<Search<'a>, QueryError> {
        let tree = self.node.tree();
        if tree.children(self.node.id()).is_empty() {
            return Err(QueryError::EmptyTree);
        }
        let group = parse_selector_group(selector)?;
        Ok(Search::new(tree, self.node.id(), group, cursor))
    }

    fn not_found<T>(&self, selector: &str, nothing: T) -> Result<T, QueryError> {
        if self.options.strict {
            Err(QueryError::NotFound {
                selector: selector.to_string(),
            })
        } else {
            Ok(nothing)
        }
    }

    /// Every match, produced lazily in document order.
    ///
    /// # Errors
    /// [`QueryError::Parse`] for a bad selector, [`QueryError::EmptyTree`]
    /// if the node has no children.
    pub fn all(&self, selector: &str) -> Result<Matches<'a>, QueryError> {
        let search = self.search(selector, MatchCursor::all())?;
        Ok(Matches { search })
    }

    /// The match at `index`; negative indexes count from the end.
    ///
    /// The traversal stops as soon as the wanted match is reached.
    ///
    /// # Errors
    /// As [`Query::all`], plus [`QueryError::NotFound`] in strict mode when
    /// there is no such match.
    pub fn one(&self, selector: &str, index: isize) -> Result<Option<NodeRef<'a>>, QueryError> {
        let tree = self.node.tree();
        let found = self
            .search(selector, MatchCursor::at(index))?
            .next()
            .map(|id| NodeRef::new(tree, id));
        match found {
            Some(node) => Ok(Some(node)),
            None => self.not_found(selector, None),
        }
    }

    /// The first match.
    ///
    /// # Errors
    /// See [`Query::one`].
    pub fn first(&self, selector: &str) -> Result<Option<NodeRef<'a>>, QueryError> {
        self.one(selector, 0)
    }

    /// The last match.
    ///
    /// # Errors
    /// See [`Query::one`].
    pub fn end(&self, selector: &str) -> Result<Option<NodeRef<'a>>, QueryError> {
        self.one(selector, -1)
    }

    /// Run the search to completion. Without an index every match is
    /// returned; with one, the match at that index.
    ///
    /// # Errors
    /// As [`Query::one`].
    pub fn find(&self, selector: &str, index: Option<isize>) -> Result<Found<'a>, QueryError> {
        let tree = self.node.tree();
        let cursor = index.map_or_else(MatchCursor::all, MatchCursor::at);
        let mut rows: Vec<NodeRef<'a>> = self
            .search(selector, cursor)?
            .map(|id| NodeRef::new(tree, id))
            .collect();

        if rows.is_empty() {
            return self.not_found(selector, Found::Nothing);
        }
        Ok(match index {
            None => Found::All(rows),
            Some(_) => rows.pop().map_or(Found::Nothing, Found::One),
        })
    }
}
