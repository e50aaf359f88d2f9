mod parser;
mod reader;

pub use parser::{Forest, ParseError, parse};
pub use reader::LoadError;
