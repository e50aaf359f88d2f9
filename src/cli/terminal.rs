//! Colouring for edit scripts and query messages

use owo_colors::{OwoColorize, Style};
use supports_color::Stream;

/// Styles output when the target stream is a colour terminal.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    /// Palette for lines written to standard output.
    pub fn stdout() -> Self {
        Self::detect(Stream::Stdout)
    }

    /// Palette for messages written to standard error.
    pub fn stderr() -> Self {
        Self::detect(Stream::Stderr)
    }

    fn detect(stream: Stream) -> Self {
        Self {
            enabled: supports_color::on(stream).is_some(),
        }
    }

    /// A header or `exit` line that moves between blocks.
    pub fn context(self, line: &str) -> String {
        self.paint(line, Style::new().dimmed())
    }

    /// A line an edit script writes.
    pub fn added(self, line: &str) -> String {
        self.paint(line, Style::new().green())
    }

    /// A note about a match or an edit.
    pub fn notice(self, message: &str) -> String {
        self.paint(message, Style::new().yellow())
    }

    fn paint(self, text: &str, style: Style) -> String {
        if self.enabled {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }
}
