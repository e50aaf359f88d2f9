//! In-memory model of a parsed configuration
//!
//! The [`Tree`] knows nothing about files or streams. It stores the parsed
//! line records together with a word graph built per nesting block: records
//! of the same block share a node for every leading word they have in common
//! and diverge at the first differing word.

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use tracing::{debug, instrument};

use crate::{
    domain::{
        Config,
        line::{LineId, LineRecord},
        selection::Selection,
    },
    storage::{Forest, ParseError, parse},
};

/// Identifies a nesting block within a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub(crate) usize);

/// The kind of edge between two graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// From a word to the next word of the same line.
    Word,
    /// From a line-terminal word to the root of the block the line opens.
    Block,
}

/// What a graph node stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The synthetic root of a block's word graph.
    Root(BlockId),
    /// One word at one position, given the words before it.
    Word(String),
}

/// A vertex of the word graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordNode {
    pub(crate) kind: NodeKind,
    /// Records whose words pass through (or end at) this node, in source order.
    pub(crate) lines: Vec<LineId>,
    /// Records whose last word is this node, in source order.
    pub(crate) terminal: Vec<LineId>,
}

impl WordNode {
    const fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            terminal: Vec::new(),
        }
    }

    /// The node's word, or `None` for a block root.
    #[must_use]
    pub fn word(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Root(_) => None,
            NodeKind::Word(word) => Some(word.as_str()),
        }
    }

    /// Whether some record ends at this node.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.terminal.is_empty()
    }
}

/// A nesting block: the top level, or the lines under a block header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block {
    /// Root of the block's word graph.
    pub(crate) root: NodeIndex,
    /// The line-terminal node that introduces this block. `None` at the top
    /// level.
    pub(crate) owner: Option<NodeIndex>,
    /// The first header record that opened the block.
    pub(crate) header: Option<LineId>,
    /// Member records, in source order. Headers with identical words share
    /// one block, so members of several headers may be interleaved here.
    pub(crate) lines: Vec<LineId>,
}

/// An in-memory representation of a parsed configuration.
///
/// Line records and the word graph are stored as separate components:
/// - Records: `Vec<LineRecord>`, indexed by [`LineId`] (source order)
/// - Terminal node of each record: `Vec<NodeIndex>`
/// - Containing block of each record: `Vec<BlockId>`
/// - Blocks: `Vec<Block>`, indexed by [`BlockId`]; block 0 is the top level
/// - Word graph: `DiGraph<WordNode, Link>`
///
/// The tree is read-only once built. Navigation happens through
/// [`Selection`]s borrowed from it.
#[derive(Debug, Clone)]
pub struct Tree {
    config: Config,
    lines: Vec<LineRecord>,
    terminals: Vec<NodeIndex>,
    containing: Vec<BlockId>,
    blocks: Vec<Block>,
    graph: DiGraph<WordNode, Link>,
}

impl Tree {
    /// Parses configuration lines using the given parser configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedIndent`] if a line dedents to a width
    /// that matches no enclosing block.
    pub fn from_lines<I, S>(lines: I, config: &Config) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let forest = parse(lines, config)?;
        Ok(Self::from_forest(forest, config.clone()))
    }

    /// Builds the word graph for a parsed forest.
    #[must_use]
    #[instrument(level = "debug", skip_all)]
    pub fn from_forest(forest: Forest, config: Config) -> Self {
        let Forest { lines, roots } = forest;
        let count = lines.len();

        let mut tree = Self {
            config,
            lines,
            terminals: vec![NodeIndex::end(); count],
            containing: vec![BlockId(0); count],
            blocks: Vec::new(),
            graph: DiGraph::with_capacity(count * 2, count * 2),
        };

        let top = tree.add_block(None, None);
        tree.insert_block(top, &roots);

        debug!(
            lines = count,
            blocks = tree.blocks.len(),
            nodes = tree.graph.node_count(),
            "built word graph"
        );

        tree
    }

    /// The parser configuration the tree was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// A selection of the top-level block.
    #[must_use]
    pub fn root(&self) -> Selection<'_> {
        Selection::one(self, self.blocks[0].root)
    }

    /// Shorthand for `self.root().get(designators)`.
    #[must_use]
    pub fn get(&self, designators: &[&str]) -> Selection<'_> {
        self.root().get(designators)
    }

    /// Every record, in source order.
    pub fn lines(&self) -> impl Iterator<Item = (LineId, &LineRecord)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(|(index, line)| (LineId(index), line))
    }

    /// Looks up a record.
    #[must_use]
    pub fn line(&self, id: LineId) -> Option<&LineRecord> {
        self.lines.get(id.0)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the configuration has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The whole configuration as text, one record per line, comments
    /// dropped.
    #[must_use]
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(LineRecord::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// Graph access used by selections.
impl Tree {
    pub(crate) fn node(&self, node: NodeIndex) -> &WordNode {
        &self.graph[node]
    }

    pub(crate) fn record(&self, id: LineId) -> &LineRecord {
        &self.lines[id.0]
    }

    pub(crate) fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub(crate) fn terminal_of(&self, id: LineId) -> NodeIndex {
        self.terminals[id.0]
    }

    pub(crate) fn block_of(&self, id: LineId) -> BlockId {
        self.containing[id.0]
    }

    /// Word children of a node, in first-insertion order.
    pub(crate) fn word_children(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .filter(|edge| *edge.weight() == Link::Word)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// The word child of `node` spelled `word`.
    pub(crate) fn word_child(&self, node: NodeIndex, word: &str) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .filter(|edge| *edge.weight() == Link::Word)
            .map(|edge| edge.target())
            .find(|target| self.graph[*target].word() == Some(word))
    }

    /// Root of the block a line-terminal node introduces.
    pub(crate) fn nested_root(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .find(|edge| *edge.weight() == Link::Block)
            .map(|edge| edge.target())
    }

    /// The previous word of the same line, or the owner of the block for a
    /// block root.
    pub(crate) fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .next()
            .map(|edge| edge.source())
    }

    /// The block whose word graph contains `node`.
    pub(crate) fn containing_block(&self, mut node: NodeIndex) -> BlockId {
        loop {
            if let NodeKind::Root(block) = self.graph[node].kind {
                return block;
            }
            match self.parent(node) {
                Some(parent) => node = parent,
                None => return BlockId(0),
            }
        }
    }
}

// Construction.
impl Tree {
    fn add_block(&mut self, owner: Option<NodeIndex>, header: Option<LineId>) -> BlockId {
        let id = BlockId(self.blocks.len());
        let root = self.graph.add_node(WordNode::new(NodeKind::Root(id)));
        if let Some(owner) = owner {
            self.graph.add_edge(owner, root, Link::Block);
        }
        self.blocks.push(Block {
            root,
            owner,
            header,
            lines: Vec::new(),
        });
        id
    }

    fn insert_block(&mut self, block: BlockId, members: &[LineId]) {
        for &line in members {
            self.blocks[block.0].lines.push(line);
            self.containing[line.0] = block;

            let mut node = self.blocks[block.0].root;
            let words = self.lines[line.0].words.clone();
            for word in words {
                node = match self.word_child(node, &word) {
                    Some(child) => child,
                    None => {
                        let child = self.graph.add_node(WordNode::new(NodeKind::Word(word)));
                        self.graph.add_edge(node, child, Link::Word);
                        child
                    }
                };
                self.graph[node].lines.push(line);
            }

            self.graph[node].terminal.push(line);
            self.terminals[line.0] = node;

            let children = self.lines[line.0].children.clone();
            if !children.is_empty() {
                let nested = match self.nested_root(node) {
                    Some(root) => self.containing_block(root),
                    None => self.add_block(Some(node), Some(line)),
                };
                self.insert_block(nested, &children);
            }
        }
    }
}
