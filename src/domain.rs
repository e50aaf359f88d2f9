//! The configuration model and the operations over it.
//!
//! This module contains the line records, the word graph built from them,
//! selections over that graph and edit script generation.

mod config;
pub use config::Config;

mod designator;
pub use designator::Designator;

/// Line records and their identifiers.
pub mod line;
pub use line::{LineId, LineRecord};

mod patch;
pub use patch::Replacement;

mod selection;
pub use selection::{EXIT, Outcome, Selection};

mod tree;
pub use tree::{BlockId, Link, NodeKind, Tree, WordNode};
