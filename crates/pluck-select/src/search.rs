//! Lazy depth-first search of a tree for nodes matching a selector group.
//!
//! Candidates are found top-down, but each candidate is validated bottom-up:
//! the last step of a chain is tested against the node, the step before it
//! against the node's parent, and so on. A node is only considered once the
//! traversal is at least as deep as the chain is long, so the walk up never
//! leaves the subtree being searched.
//!
//! Positional queries ([`MatchCursor::at`]) stop the traversal as soon as the
//! wanted match is found. Negative positions count from the end: children are
//! visited last-first and each node is checked after its subtree, which is
//! exactly document order reversed. The price is that a backward query walks
//! the whole subtree of the match it stops on before checking that match, so
//! `end` on an element with a large subtree visits all of it.

use std::iter::FusedIterator;

use pluck_dom::{DomTree, NodeId};

use crate::selector::{SelectorChain, SelectorGroup, step_matches};

/// Check `node` and its direct parents against `chain`, right to left.
#[must_use]
pub fn chain_matches(tree: &DomTree, chain: &SelectorChain, node: NodeId) -> bool {
    let mut current = Some(node);
    for step in chain.steps().iter().rev() {
        let Some(id) = current else {
            return false;
        };
        if !step_matches(step, tree, id) {
            return false;
        }
        current = tree.parent(id);
    }
    true
}

/// What the search does with a node that passed its chain check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// Yield it and keep going.
    Emit,
    /// Yield it and end the whole search.
    EmitAndStop,
    /// Count it but do not yield it.
    Skip,
}

/// A node waiting on the traversal stack, with its depth below the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    /// Not reached yet: schedule its children (and, when reversed, its check).
    Visit(NodeId, usize),
    /// Subtree done; check the node itself (reversed traversal only).
    Check(NodeId, usize),
}

/// Positional state of one query.
///
/// The count of matches seen is shared by every chain of a group, so
/// `a, b` at index 2 may land on a `b` after two `a`s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchCursor {
    target: Option<isize>,
    seen: usize,
}

impl MatchCursor {
    /// Yield every match.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            target: None,
            seen: 0,
        }
    }

    /// Yield only the match at `index`. Negative indexes count from the end:
    /// `-1` is the last match.
    #[must_use]
    pub const fn at(index: isize) -> Self {
        Self {
            target: Some(index),
            seen: 0,
        }
    }

    /// The wanted position, if any.
    #[must_use]
    pub const fn target(&self) -> Option<isize> {
        self.target
    }

    /// Matches counted so far without being yielded.
    #[must_use]
    pub const fn seen(&self) -> usize {
        self.seen
    }

    /// Whether children are visited last-first.
    #[must_use]
    pub const fn is_reversed(&self) -> bool {
        matches!(self.target, Some(index) if index < 0)
    }

    fn record(&mut self) -> Verdict {
        let Some(index) = self.target else {
            return Verdict::Emit;
        };
        let wanted = if index < 0 {
            index.unsigned_abs() - 1
        } else {
            index.unsigned_abs()
        };
        if self.seen == wanted {
            Verdict::EmitAndStop
        } else {
            self.seen += 1;
            Verdict::Skip
        }
    }
}

/// Iterator over the nodes below `root` that match a [`SelectorGroup`].
///
/// Each chain of the group is searched over the whole subtree in turn. The
/// traversal only advances when the iterator is polled, and dropping it
/// part-way is fine.
#[derive(Debug, Clone)]
pub struct Search<'a> {
    tree: &'a DomTree,
    root: NodeId,
    group: SelectorGroup,
    chain_index: usize,
    cursor: MatchCursor,
    /// The next node to handle is on top.
    stack: Vec<Pending>,
    visited: usize,
    done: bool,
}

impl<'a> Search<'a> {
    /// Prepare a search; nothing is visited until the first call to `next`.
    #[must_use]
    pub fn new(tree: &'a DomTree, root: NodeId, group: SelectorGroup, cursor: MatchCursor) -> Self {
        Self {
            tree,
            root,
            group,
            chain_index: 0,
            cursor,
            stack: vec![Pending::Visit(root, 0)],
            visited: 0,
            done: false,
        }
    }

    /// Number of nodes taken off the traversal so far, over all chains.
    #[must_use]
    pub const fn visited(&self) -> usize {
        self.visited
    }

    /// The tree being searched.
    #[must_use]
    pub const fn tree(&self) -> &'a DomTree {
        self.tree
    }

    /// The positional state.
    #[must_use]
    pub const fn cursor(&self) -> &MatchCursor {
        &self.cursor
    }

    fn push_children(&mut self, node: NodeId, depth: usize) {
        let tree = self.tree;
        let children = tree
            .children(node)
            .iter()
            .map(|&child| Pending::Visit(child, depth + 1));
        // The stack pops from the end, so forward order pushes last-first.
        if self.cursor.is_reversed() {
            self.stack.extend(children);
        } else {
            self.stack.extend(children.rev());
        }
    }

    /// Run the current chain against `node` and apply the cursor.
    fn check(&mut self, node: NodeId, depth: usize) -> Option<NodeId> {
        let chain = &self.group.chains()[self.chain_index];
        if depth < chain.len() || !chain_matches(self.tree, chain, node) {
            return None;
        }
        tracing::trace!("{node:?} matches {chain}");
        match self.cursor.record() {
            Verdict::Emit => Some(node),
            Verdict::EmitAndStop => {
                self.finish();
                Some(node)
            }
            Verdict::Skip => None,
        }
    }

    fn finish(&mut self) {
        self.stack.clear();
        self.done = true;
        tracing::debug!(
            "Search for {} finished after visiting {} nodes",
            self.group,
            self.visited
        );
    }
}

impl Iterator for Search<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while !self.done {
            let Some(pending) = self.stack.pop() else {
                self.chain_index += 1;
                if self.chain_index < self.group.chains().len() {
                    self.stack.push(Pending::Visit(self.root, 0));
                } else {
                    self.finish();
                }
                continue;
            };

            let (node, depth) = match pending {
                Pending::Visit(node, depth) => {
                    self.visited += 1;
                    if self.cursor.is_reversed() {
                        self.stack.push(Pending::Check(node, depth));
                        self.push_children(node, depth);
                        continue;
                    }
                    self.push_children(node, depth);
                    (node, depth)
                }
                Pending::Check(node, depth) => (node, depth),
            };

            if let Some(found) = self.check(node, depth) {
                return Some(found);
            }
        }
        None
    }
}

impl FusedIterator for Search<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_all_always_emits() {
        let mut cursor = MatchCursor::all();
        assert_eq!(cursor.record(), Verdict::Emit);
        assert_eq!(cursor.record(), Verdict::Emit);
        assert_eq!(cursor.seen(), 0);
    }

    #[test]
    fn test_cursor_forward_index() {
        let mut cursor = MatchCursor::at(2);
        assert!(!cursor.is_reversed());
        assert_eq!(cursor.record(), Verdict::Skip);
        assert_eq!(cursor.record(), Verdict::Skip);
        assert_eq!(cursor.record(), Verdict::EmitAndStop);
        assert_eq!(cursor.seen(), 2);
    }

    #[test]
    fn test_cursor_backward_index() {
        let mut cursor = MatchCursor::at(-1);
        assert!(cursor.is_reversed());
        assert_eq!(cursor.record(), Verdict::EmitAndStop);

        let mut cursor = MatchCursor::at(-3);
        assert_eq!(cursor.record(), Verdict::Skip);
        assert_eq!(cursor.record(), Verdict::Skip);
        assert_eq!(cursor.record(), Verdict::EmitAndStop);
        assert_eq!(cursor.target(), Some(-3));
    }
}
