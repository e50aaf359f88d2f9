//! Structured access to indentation-nested device configurations
//!
//! Configuration text (nesting by leading whitespace, `!` comments, optional
//! leading `no`) is parsed into a [`Tree`]. Lines of the same block share
//! graph nodes for their common leading words, so a [`Selection`] can name a
//! position by its words, query the lines behind it, and generate the lines
//! needed to change it with [`Selection::set`].
//!
//! ```
//! use reconfig::Tree;
//!
//! let tree = Tree::parse("interface Serial0\n ip address 1.1.1.1 255.255.255.0\n!\n")?;
//! let address = tree.get(&["interface Serial0", "ip address"]);
//!
//! assert_eq!(address.text(), [" ip address 1.1.1.1 255.255.255.0"]);
//! assert_eq!(
//!     address.set(&[], "ip address 2.2.2.2 255.255.255.0")?,
//!     ["interface Serial0", " ip address 2.2.2.2 255.255.255.0", "exit"]
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod domain;
pub use domain::{
    BlockId, Config, Designator, LineId, LineRecord, Link, Outcome, Replacement, Selection, Tree,
    WordNode,
};

/// Turning raw text into line records.
pub mod storage;
pub use storage::{Forest, LoadError, ParseError};
