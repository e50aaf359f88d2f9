//! Reading configuration text from strings, streams and files.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use tracing::instrument;

use crate::{
    domain::{Config, Tree},
    storage::ParseError,
};

/// Errors that can occur when loading a configuration from a stream or file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The input could not be read.
    #[error("failed to read configuration")]
    Io(#[from] io::Error),
    /// The input was read but is not well formed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Tree {
    /// Parses configuration text with the default [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedIndent`] if the indentation of a line
    /// matches no enclosing block.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_with(text, &Config::default())
    }

    /// Parses configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedIndent`] if the indentation of a line
    /// matches no enclosing block.
    pub fn parse_with(text: &str, config: &Config) -> Result<Self, ParseError> {
        Self::from_lines(text.lines(), config)
    }

    /// Reads and parses every line of `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if reading fails and [`LoadError::Parse`] if
    /// the text is not well formed.
    pub fn read<R: BufRead>(reader: R, config: &Config) -> Result<Self, LoadError> {
        let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;
        Ok(Self::from_lines(lines, config)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be opened or read and
    /// [`LoadError::Parse`] if its text is not well formed.
    #[instrument(level = "debug", skip(config))]
    pub fn load(path: &Path, config: &Config) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file), config)
    }
}

impl FromStr for Tree {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
