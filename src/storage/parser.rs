//! Block parser
//!
//! Turns raw configuration lines into a forest of [`LineRecord`]s. Nesting is
//! derived from indentation width; `!` lines are comments that also close any
//! block deeper than themselves.

use tracing::{debug, instrument, trace};

use crate::domain::{
    Config,
    line::{LineId, LineRecord},
};

/// Errors that can occur while parsing configuration text.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// A line dedents to a width that matches no enclosing block.
    #[error("line {line}: indentation matches no enclosing block: '{text}'")]
    MalformedIndent {
        /// One-based line number in the parsed input.
        line: usize,
        /// The offending line.
        text: String,
    },
}

/// The line records of one input, organised by nesting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Forest {
    /// Every record, in source order. A record's [`LineId`] is its index.
    pub(crate) lines: Vec<LineRecord>,
    /// Top-level records, in source order.
    pub(crate) roots: Vec<LineId>,
}

impl Forest {
    /// Every record, in source order.
    #[must_use]
    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }

    /// Ids of the top-level records.
    #[must_use]
    pub fn roots(&self) -> &[LineId] {
        &self.roots
    }

    /// Looks up a record.
    #[must_use]
    pub fn line(&self, id: LineId) -> Option<&LineRecord> {
        self.lines.get(id.0)
    }

    fn attach(&mut self, owner: Option<LineId>, record: LineRecord) -> LineId {
        let id = LineId(self.lines.len());
        self.lines.push(record);
        match owner {
            Some(owner) => self.lines[owner.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }
}

/// An open block while parsing.
#[derive(Debug)]
struct Frame {
    /// Effective indentation width of the block's members.
    width: usize,
    /// The record that opened the block. `None` for the top level.
    owner: Option<LineId>,
    /// The most recent member and its width; the candidate owner of a deeper
    /// line. Cleared by a comment at or above its width.
    last: Option<(LineId, usize)>,
}

/// Parses raw lines into a [`Forest`].
///
/// # Errors
///
/// Returns [`ParseError::MalformedIndent`] if a line dedents to a width that
/// matches no enclosing block.
#[instrument(level = "debug", skip_all)]
pub fn parse<I, S>(lines: I, config: &Config) -> Result<Forest, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut forest = Forest::default();
    let mut stack: Vec<Frame> = Vec::new();

    for (index, raw) in lines.into_iter().enumerate() {
        let text = raw.as_ref().trim_end();
        let body = text.trim_start();
        if body.is_empty() {
            continue;
        }

        let literal = text.chars().take_while(|c| c.is_whitespace()).count();

        if body.starts_with('!') {
            close_at_comment(&mut stack, literal);
            continue;
        }

        let width = if config.is_minus_one_indent(body) {
            literal.saturating_sub(1)
        } else {
            literal
        };

        if stack.is_empty() {
            stack.push(Frame {
                width,
                owner: None,
                last: None,
            });
        }

        let malformed = || ParseError::MalformedIndent {
            line: index + 1,
            text: text.to_string(),
        };

        let mut popped = false;
        while stack.len() > 1 && stack.last().is_some_and(|frame| frame.width > width) {
            stack.pop();
            popped = true;
        }

        let Some(top) = stack.last() else {
            return Err(malformed());
        };
        if top.width > width || (popped && top.width != width) {
            return Err(malformed());
        }

        // A line deeper than the previous member opens that member's block.
        if width > top.width {
            if let Some((header, header_width)) = top.last {
                if width > header_width {
                    stack.push(Frame {
                        width,
                        owner: Some(header),
                        last: None,
                    });
                }
            }
        }

        let depth = stack.len() - 1;
        let Some(frame) = stack.last_mut() else {
            return Err(malformed());
        };
        let record = LineRecord::new(text, body, depth);
        let id = forest.attach(frame.owner, record);
        frame.last = Some((id, width));

        trace!(line = index + 1, depth, text, "parsed line");
    }

    debug!(
        lines = forest.lines.len(),
        top_level = forest.roots.len(),
        "parsed configuration"
    );

    Ok(forest)
}

/// Closes every block deeper than a comment at `width` and prevents the next
/// line from nesting under anything at or beyond it.
fn close_at_comment(stack: &mut Vec<Frame>, width: usize) {
    while stack.len() > 1 && stack.last().is_some_and(|frame| frame.width > width) {
        stack.pop();
    }
    if let Some(top) = stack.last_mut() {
        if top.last.is_some_and(|(_, last_width)| last_width >= width) {
            top.last = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn texts(forest: &Forest, ids: &[LineId]) -> Vec<String> {
        ids.iter()
            .map(|id| forest.line(*id).unwrap().text().to_string())
            .collect()
    }

    fn parse_str(text: &str) -> Result<Forest, ParseError> {
        parse(text.lines(), &Config::default())
    }

    #[test]
    fn nests_by_indentation() {
        let forest = parse_str(
            "interface Serial0\n ip address 1.1.1.1 255.255.255.0\n shutdown\n!\nhostname r1\n",
        )
        .unwrap();

        assert_eq!(texts(&forest, forest.roots()), ["interface Serial0", "hostname r1"]);
        let interface = forest.line(forest.roots()[0]).unwrap();
        assert_eq!(
            texts(&forest, interface.children()),
            [" ip address 1.1.1.1 255.255.255.0", " shutdown"]
        );
        assert_eq!(forest.line(interface.children()[0]).unwrap().depth(), 1);
    }

    #[test]
    fn nests_several_levels() {
        let forest = parse_str(
            "router bgp 1\n address-family ipv4\n  neighbor 10.0.0.1 activate\n exit-address-family\n",
        )
        .unwrap();

        let router = forest.line(forest.roots()[0]).unwrap();
        assert_eq!(
            texts(&forest, router.children()),
            [" address-family ipv4", " exit-address-family"]
        );
        let family = forest.line(router.children()[0]).unwrap();
        assert_eq!(texts(&forest, family.children()), ["  neighbor 10.0.0.1 activate"]);
        assert_eq!(forest.line(family.children()[0]).unwrap().depth(), 2);
    }

    #[test]
    fn drops_comments_and_blank_lines() {
        let forest = parse_str("! generated\n\nhostname r1   \n   \n! end\n").unwrap();

        assert_eq!(forest.lines().len(), 1);
        assert_eq!(forest.lines()[0].text(), "hostname r1");
    }

    #[test]
    fn comment_closes_block() {
        let forest = parse_str("interface A\n description a\n!\n stray\nhostname r1\n").unwrap();

        assert_eq!(
            texts(&forest, forest.roots()),
            ["interface A", " stray", "hostname r1"]
        );
        let interface = forest.line(forest.roots()[0]).unwrap();
        assert_eq!(texts(&forest, interface.children()), [" description a"]);
    }

    #[test]
    fn indented_comment_keeps_enclosing_block_open() {
        let forest = parse_str("router bgp 1\n neighbor x\n !\n neighbor y\n").unwrap();

        let router = forest.line(forest.roots()[0]).unwrap();
        assert_eq!(texts(&forest, router.children()), [" neighbor x", " neighbor y"]);
    }

    #[test]
    fn strips_leading_no_from_words() {
        let forest = parse_str("interface A\n no cdp enable\n").unwrap();
        let line = &forest.lines()[1];

        assert!(line.is_negated());
        assert_eq!(line.words(), ["cdp", "enable"]);
        assert_eq!(line.text(), " no cdp enable");
    }

    #[test]
    fn minus_one_indent_lines_are_shallower() {
        let forest = parse_str(
            "policy-map QOS\n description q\n  class VOICE\n   priority 100\n  class class-default\n   fair-queue\n",
        )
        .unwrap();

        let policy = forest.line(forest.roots()[0]).unwrap();
        assert_eq!(
            texts(&forest, policy.children()),
            [" description q", "  class VOICE", "  class class-default"]
        );
        let voice = forest.line(policy.children()[1]).unwrap();
        assert_eq!(texts(&forest, voice.children()), ["   priority 100"]);
    }

    #[test]
    fn minus_one_indent_can_be_disabled() {
        let config = Config::with_minus_one_indent(None).unwrap();
        let forest = parse(
            "policy-map QOS\n description q\n  class VOICE\n".lines(),
            &config,
        )
        .unwrap();

        let description = forest.line(forest.line(forest.roots()[0]).unwrap().children()[0]);
        assert_eq!(description.unwrap().children().len(), 1);
    }

    #[test_case("a\n  b\n c\n", 3; "dedent between levels")]
    #[test_case(" a\nb\n", 2; "dedent above first line")]
    #[test_case("a\n b\n  c\n    d\n   e\n", 5; "dedent between nested levels")]
    fn malformed_indentation(text: &str, line: usize) {
        let error = parse_str(text).unwrap_err();
        let ParseError::MalformedIndent { line: actual, .. } = error;
        assert_eq!(actual, line);
    }

    #[test]
    fn indented_first_line_sets_top_level_width() {
        let forest = parse_str(" ip address 1.1.1.1 255.255.255.0\n shutdown\n").unwrap();

        assert_eq!(forest.roots().len(), 2);
        assert!(forest.lines().iter().all(|line| line.depth() == 0));
    }
}
