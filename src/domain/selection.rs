//! Navigation over a parsed configuration
//!
//! A [`Selection`] is a borrowed handle over one or more nodes of a
//! [`Tree`]'s word graph. Every operation is a pure read and is total: when
//! nothing matches, the result is the undefined selection, which is falsy and
//! can be navigated further without checks.

use std::{collections::BTreeSet, fmt};

use nonempty::NonEmpty;
use petgraph::graph::NodeIndex;
use regex::Regex;

use crate::domain::{
    designator::Designator,
    line::{LineId, LineRecord},
    tree::{NodeKind, Tree},
};

/// The literal line that leaves one level of configuration context.
pub const EXIT: &str = "exit";

/// How many structural positions a selection stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Exactly one node, with a single continuation to the end of its line.
    Found,
    /// Several nodes, or a node whose continuation diverges.
    Ambiguous,
    /// Nothing matched.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Nodes {
    Undefined,
    One(NodeIndex),
    Many(NonEmpty<NodeIndex>),
}

/// A handle over one or more nodes of a [`Tree`].
///
/// Selections borrow the tree they were produced from and never mutate it.
#[derive(Clone)]
pub struct Selection<'a> {
    tree: &'a Tree,
    nodes: Nodes,
}

impl PartialEq for Selection<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.nodes == other.nodes
    }
}

impl Eq for Selection<'_> {}

impl fmt::Debug for Selection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<_> = self
            .nodes()
            .into_iter()
            .map(|node| self.tree.node(node).word().unwrap_or("<block>"))
            .collect();
        f.debug_struct("Selection")
            .field("nodes", &self.nodes)
            .field("words", &words)
            .finish()
    }
}

impl<'a> Selection<'a> {
    pub(crate) const fn one(tree: &'a Tree, node: NodeIndex) -> Self {
        Self {
            tree,
            nodes: Nodes::One(node),
        }
    }

    /// The undefined selection of `tree`.
    #[must_use]
    pub const fn undefined(tree: &'a Tree) -> Self {
        Self {
            tree,
            nodes: Nodes::Undefined,
        }
    }

    pub(crate) fn from_nodes(tree: &'a Tree, nodes: Vec<NodeIndex>) -> Self {
        let mut unique = Vec::with_capacity(nodes.len());
        for node in nodes {
            if !unique.contains(&node) {
                unique.push(node);
            }
        }

        let nodes = match NonEmpty::from_vec(unique) {
            None => Nodes::Undefined,
            Some(nodes) if nodes.tail.is_empty() => Nodes::One(nodes.head),
            Some(nodes) => Nodes::Many(nodes),
        };
        Self { tree, nodes }
    }

    pub(crate) fn nodes(&self) -> Vec<NodeIndex> {
        match &self.nodes {
            Nodes::Undefined => Vec::new(),
            Nodes::One(node) => vec![*node],
            Nodes::Many(nodes) => nodes.iter().copied().collect(),
        }
    }

    pub(crate) const fn first(&self) -> Option<NodeIndex> {
        match &self.nodes {
            Nodes::Undefined => None,
            Nodes::One(node) => Some(*node),
            Nodes::Many(nodes) => Some(nodes.head),
        }
    }

    /// The tree this selection navigates.
    #[must_use]
    pub const fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// Whether anything was matched.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self.nodes, Nodes::Undefined)
    }

    /// Number of matched nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.nodes {
            Nodes::Undefined => 0,
            Nodes::One(_) => 1,
            Nodes::Many(nodes) => 1 + nodes.tail.len(),
        }
    }

    /// Whether nothing was matched; the same as `!self.is_present()`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.is_present()
    }

    /// Classifies the selection as found, ambiguous or absent.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        match &self.nodes {
            Nodes::Undefined => Outcome::Absent,
            Nodes::One(node) if !self.diverges(*node) => Outcome::Found,
            _ => Outcome::Ambiguous,
        }
    }

    /// Matches designators one after another, starting from this selection.
    ///
    /// Each designator is a chain of words within one line. Its first word
    /// may continue the current line or start a line of the block the current
    /// node opens; the remaining words must continue the same line. `no`
    /// tokens are ignored unless the designator is just `no`. The result
    /// aggregates every surviving path, or is undefined if none survives.
    #[must_use]
    pub fn get(&self, designators: &[&str]) -> Self {
        let mut current = self.nodes();
        for designator in designators {
            if current.is_empty() {
                break;
            }
            current = self.match_designator(&current, &Designator::new(designator));
        }
        Self::from_nodes(self.tree, current)
    }

    /// Like [`Self::get`], but returns one selection per surviving path.
    #[must_use]
    pub fn get_all(&self, designators: &[&str]) -> Vec<Self> {
        self.get(designators).split()
    }

    /// One selection per child of the matched nodes, in source order,
    /// optionally restricted to children whose word matches `filter`.
    ///
    /// Children are the words continuing the current line followed by the
    /// first words of the block the node opens.
    #[must_use]
    pub fn all(&self, filter: Option<&Regex>) -> Vec<Self> {
        let tree = self.tree;
        self.expansion()
            .into_iter()
            .filter(|node| {
                filter.is_none_or(|pattern| {
                    tree.node(*node)
                        .word()
                        .is_some_and(|word| pattern.is_match(word))
                })
            })
            .map(|node| Self::one(tree, node))
            .collect()
    }

    /// Immediate children of the matched nodes.
    ///
    /// A line-terminal node without children yields itself.
    #[must_use]
    pub fn kids(&self) -> Vec<Self> {
        let kids = self.all(None);
        if kids.is_empty() && self.first().is_some_and(|node| self.tree.node(node).is_terminal())
        {
            return vec![self.clone()];
        }
        kids
    }

    /// The selection itself if it stands for exactly one line position,
    /// `None` if it is ambiguous or undefined.
    #[must_use]
    pub fn single(&self) -> Option<Self> {
        (self.outcome() == Outcome::Found).then(|| self.clone())
    }

    /// Like [`Self::single`], but returns the undefined selection instead of
    /// `None`.
    #[must_use]
    pub fn zoom(&self) -> Self {
        self.single()
            .unwrap_or_else(|| Self::undefined(self.tree))
    }

    /// Follows the first continuation at every branch until a line ends.
    ///
    /// Ties are broken by source order.
    #[must_use]
    pub fn endpt(&self) -> Self {
        let Some(mut node) = self.first() else {
            return Self::undefined(self.tree);
        };
        while !self.tree.node(node).is_terminal() {
            match self.tree.word_children(node).first() {
                Some(child) => node = *child,
                None => break,
            }
        }
        Self::one(self.tree, node)
    }

    /// The end of the line that follows the current one in its block.
    ///
    /// On a block root this is the block's first line. Undefined after the
    /// last line of a block.
    #[must_use]
    pub fn next(&self) -> Self {
        let tree = self.tree;
        let Some(node) = self.first() else {
            return Self::undefined(tree);
        };

        let following = match tree.node(node).kind {
            NodeKind::Root(block) => tree.block(block).lines.first().copied(),
            NodeKind::Word(_) => tree.node(node).lines.first().and_then(|line| {
                let siblings = &tree.block(tree.block_of(*line)).lines;
                let position = siblings.iter().position(|sibling| sibling == line)?;
                siblings.get(position + 1).copied()
            }),
        };

        following.map_or_else(
            || Self::undefined(tree),
            |line| Self::one(tree, tree.terminal_of(line)),
        )
    }

    /// The node that introduces the block containing the selection.
    ///
    /// Undefined at the top level.
    #[must_use]
    pub fn context(&self) -> Self {
        let tree = self.tree;
        let owners = self
            .nodes()
            .into_iter()
            .filter_map(|node| tree.block(tree.containing_block(node)).owner)
            .collect();
        Self::from_nodes(tree, owners)
    }

    /// The root of the block introduced by the matched node(s).
    ///
    /// Undefined if no matched node introduces a block.
    #[must_use]
    pub fn subs(&self) -> Self {
        let tree = self.tree;
        let roots = self
            .nodes()
            .into_iter()
            .filter_map(|node| tree.nested_root(node))
            .collect();
        Self::from_nodes(tree, roots)
    }

    /// Whether every matched node introduces a nested block.
    #[must_use]
    pub fn block(&self) -> bool {
        self.is_present()
            && self
                .nodes()
                .into_iter()
                .all(|node| self.tree.nested_root(node).is_some())
    }

    /// The records passing through the matched nodes, in source order.
    #[must_use]
    pub fn lines(&self) -> Vec<&'a LineRecord> {
        let tree = self.tree;
        self.line_ids()
            .into_iter()
            .map(|id| tree.record(id))
            .collect()
    }

    /// Text of every line passing through the matched nodes, in source
    /// order.
    #[must_use]
    pub fn text(&self) -> Vec<&'a str> {
        self.lines().into_iter().map(LineRecord::text).collect()
    }

    /// Like [`Self::text`], but also includes every line nested under those
    /// lines.
    #[must_use]
    pub fn alltext(&self) -> Vec<&'a str> {
        self.subtree().into_iter().map(LineRecord::text).collect()
    }

    /// The records behind [`Self::alltext`].
    pub(crate) fn subtree(&self) -> Vec<&'a LineRecord> {
        let tree = self.tree;
        let mut ids = BTreeSet::new();
        let mut pending: Vec<LineId> = self.line_ids().into_iter().collect();
        while let Some(id) = pending.pop() {
            if ids.insert(id) {
                pending.extend_from_slice(tree.record(id).children());
            }
        }
        ids.into_iter().map(|id| tree.record(id)).collect()
    }

    /// The header lines, top-down, that enter the block containing the
    /// selection.
    #[must_use]
    pub fn setcontext(&self) -> Vec<&'a str> {
        let tree = self.tree;
        let Some(node) = self.first() else {
            return Vec::new();
        };

        let mut headers = Vec::new();
        let mut block = tree.containing_block(node);
        while let Some(header) = tree.block(block).header {
            headers.push(tree.record(header).text());
            block = tree.block_of(header);
        }
        headers.reverse();
        headers
    }

    /// One [`EXIT`] per line of [`Self::setcontext`].
    #[must_use]
    pub fn unsetcontext(&self) -> Vec<&'static str> {
        vec![EXIT; self.contextcount()]
    }

    /// Number of blocks enclosing the selection.
    #[must_use]
    pub fn contextcount(&self) -> usize {
        self.setcontext().len()
    }

    /// Whether [`Self::text`] equals `text`, ignoring whitespace differences
    /// and blank lines.
    #[must_use]
    pub fn teql(&self, text: &str) -> bool {
        let ours = self.text().into_iter().map(|line| line.split_whitespace().collect::<Vec<_>>());
        let theirs = text
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>())
            .filter(|words| !words.is_empty());
        ours.eq(theirs)
    }

    /// The word of the first matched node. `None` on a block root or the
    /// undefined selection.
    #[must_use]
    pub fn word(&self) -> Option<&'a str> {
        let tree = self.tree;
        self.first().and_then(|node| tree.node(node).word())
    }

    /// The words leading from the start of the line to the first matched
    /// node.
    #[must_use]
    pub fn words(&self) -> Vec<&'a str> {
        let tree = self.tree;
        let mut words = Vec::new();
        let mut current = self.first();
        while let Some(node) = current {
            let Some(word) = tree.node(node).word() else {
                break;
            };
            words.push(word);
            current = tree.parent(node);
        }
        words.reverse();
        words
    }
}

impl Selection<'_> {
    fn split(&self) -> Vec<Self> {
        self.nodes()
            .into_iter()
            .map(|node| Self::one(self.tree, node))
            .collect()
    }

    /// Children of every matched node: word children, then the first words
    /// of an owned block.
    fn expansion(&self) -> Vec<NodeIndex> {
        self.nodes()
            .into_iter()
            .flat_map(|node| self.expand(node))
            .collect()
    }

    fn expand(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut children = self.tree.word_children(node);
        if let Some(root) = self.tree.nested_root(node) {
            children.extend(self.tree.word_children(root));
        }
        children
    }

    fn match_designator(&self, nodes: &[NodeIndex], designator: &Designator) -> Vec<NodeIndex> {
        let Some((first, rest)) = designator.tokens().split_first() else {
            return nodes.to_vec();
        };

        nodes
            .iter()
            .flat_map(|node| self.expand(*node))
            .filter(|node| self.tree.node(*node).word() == Some(first.as_str()))
            .filter_map(|start| {
                rest.iter()
                    .try_fold(start, |node, word| self.tree.word_child(node, word))
            })
            .collect()
    }

    /// Whether following `node` forward can reach more than one line end.
    fn diverges(&self, mut node: NodeIndex) -> bool {
        loop {
            let children = self.tree.word_children(node);
            match children.as_slice() {
                [] => return false,
                [only] if !self.tree.node(node).is_terminal() => node = *only,
                _ => return true,
            }
        }
    }

    fn line_ids(&self) -> BTreeSet<LineId> {
        let tree = self.tree;
        self.nodes()
            .into_iter()
            .flat_map(|node| match tree.node(node).kind {
                NodeKind::Root(block) => tree.block(block).lines.clone(),
                NodeKind::Word(_) => tree.node(node).lines.clone(),
            })
            .collect()
    }
}
