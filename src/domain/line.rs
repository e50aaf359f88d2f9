use std::fmt;

/// Identifies a [`LineRecord`] within the tree that owns it.
///
/// Ids are handed out in source order, so comparing two ids compares the
/// position of the lines in the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId(pub(crate) usize);

impl LineId {
    /// Zero-based position of the line among the records of its tree.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One logical configuration line as originally written.
///
/// Comment lines never become records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    /// The line with trailing whitespace removed. Indentation is kept.
    pub(crate) text: String,
    /// Word tokens used for matching. A leading `no` is not included.
    pub(crate) words: Vec<String>,
    /// Whether the line started with `no`.
    pub(crate) negated: bool,
    /// Structural nesting depth; top-level lines have depth 0.
    pub(crate) depth: usize,
    /// Records of the block this line opens, in source order.
    pub(crate) children: Vec<LineId>,
}

impl LineRecord {
    /// Splits a line body into a record.
    ///
    /// `text` is the full line (indentation included) and `body` the part
    /// after the indentation.
    pub(crate) fn new(text: &str, body: &str, depth: usize) -> Self {
        let mut words: Vec<String> = body.split_whitespace().map(str::to_string).collect();
        let negated = words.len() > 1 && words[0] == "no";
        if negated {
            words.remove(0);
        }

        Self {
            text: text.to_string(),
            words,
            negated,
            depth,
            children: Vec::new(),
        }
    }

    /// The original text of the line, without trailing whitespace.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text without its indentation.
    #[must_use]
    pub fn body(&self) -> &str {
        self.text.trim_start()
    }

    /// The words used for matching.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Whether the line was written with a leading `no`.
    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    /// Structural nesting depth.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the line opens a nested block.
    #[must_use]
    pub fn opens_block(&self) -> bool {
        !self.children.is_empty()
    }

    /// Ids of the records in the block this line opens.
    #[must_use]
    pub fn children(&self) -> &[LineId] {
        &self.children
    }

    /// Structural identity of the line relative to a base depth.
    ///
    /// Two lines with equal keys differ at most in whitespace.
    pub(crate) fn key(&self, base_depth: usize) -> (usize, bool, &[String]) {
        (
            self.depth.saturating_sub(base_depth),
            self.negated,
            &self.words,
        )
    }
}
