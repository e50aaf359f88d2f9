use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Parser configuration.
///
/// Holds the tunables that change how raw configuration text is turned into
/// nested blocks. A [`Tree`](crate::Tree) keeps the configuration it was built
/// with so that desired-state text handed to
/// [`Selection::set`](crate::Selection::set) is parsed the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Versions", into = "Versions")]
pub struct Config {
    /// Lines whose body matches this pattern are parsed one indentation
    /// column shallower than they are written.
    ///
    /// Some devices print `class` entries inside a `policy-map` one column
    /// deeper than their siblings. The default pattern is `^class `.
    ///
    /// `None` disables the adjustment.
    minus_one_indent: Option<Regex>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            minus_one_indent: Regex::new(DEFAULT_MINUS_ONE_INDENT).ok(),
        }
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.minus_one_indent().map(Regex::as_str) == other.minus_one_indent().map(Regex::as_str)
    }
}

impl Eq for Config {}

impl Config {
    /// Creates a configuration with the given minus-one-indent pattern.
    ///
    /// `None` (or an empty pattern) disables the adjustment.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn with_minus_one_indent(pattern: Option<&str>) -> Result<Self, regex::Error> {
        let minus_one_indent = match pattern {
            Some(pattern) if !pattern.is_empty() => Some(Regex::new(pattern)?),
            _ => None,
        };
        Ok(Self { minus_one_indent })
    }

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the minus-one-indent pattern, if enabled.
    #[must_use]
    pub const fn minus_one_indent(&self) -> Option<&Regex> {
        self.minus_one_indent.as_ref()
    }

    /// Whether a line body (the text after its indentation) is parsed one
    /// column shallower than written.
    #[must_use]
    pub fn is_minus_one_indent(&self, body: &str) -> bool {
        self.minus_one_indent
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(body))
    }
}

const DEFAULT_MINUS_ONE_INDENT: &str = "^class ";

fn default_minus_one_indent() -> String {
    DEFAULT_MINUS_ONE_INDENT.to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        /// Regular expression matched against each line body.
        ///
        /// An empty string disables the adjustment.
        #[serde(default = "default_minus_one_indent")]
        minus_one_indent: String,
    },
}

impl TryFrom<Versions> for Config {
    type Error = String;

    fn try_from(versions: Versions) -> Result<Self, Self::Error> {
        match versions {
            Versions::V1 { minus_one_indent } => {
                Self::with_minus_one_indent(Some(&minus_one_indent))
                    .map_err(|e| format!("invalid minus_one_indent pattern: {e}"))
            }
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            minus_one_indent: config
                .minus_one_indent
                .map(|pattern| pattern.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}
