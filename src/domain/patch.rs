//! Edit scripts
//!
//! [`Selection::set`] compares part of a configuration with a desired state
//! and produces the lines that would move the configuration there: enter the
//! right block, restate the desired lines, leave again.

use std::{iter, ptr};

use tracing::{debug, instrument};

use crate::{
    domain::{
        line::LineRecord,
        selection::{EXIT, Selection},
        tree::Tree,
    },
    storage::ParseError,
};

/// The unit of configuration an edit script replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// Nothing matched; the desired lines are added under the deepest
    /// position the designators reach.
    Create,
    /// A block header together with everything nested under it. Chosen when
    /// the desired text restates the header.
    Block,
    /// Everything nested under a block header, without the header.
    BlockContent,
    /// The matched lines and anything nested under them.
    Line,
}

#[derive(Debug)]
struct Plan<'a> {
    replacement: Replacement,
    context: Vec<&'a str>,
    current: Vec<&'a LineRecord>,
}

impl<'a> Selection<'a> {
    /// Generates the lines that bring the part of the configuration named by
    /// `designators` into the state described by `desired`.
    ///
    /// Returns an empty vector if the current and desired lines already
    /// agree, ignoring whitespace. Otherwise returns the header lines
    /// entering the target's block, the desired lines re-indented below them,
    /// and one `exit` per entered block.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedIndent`] if `desired` is not well
    /// formed.
    #[instrument(level = "debug", skip(self, desired))]
    pub fn set(&self, designators: &[&str], desired: &str) -> Result<Vec<String>, ParseError> {
        let config = self.tree().config();
        let desired = Tree::from_lines(desired.lines(), config)?;
        let wanted: Vec<&LineRecord> = desired.lines().map(|(_, line)| line).collect();

        let plan = self.plan(designators, &desired);

        if normalize(&plan.current) == normalize(&wanted) {
            debug!(replacement = ?plan.replacement, "already in desired state");
            return Ok(Vec::new());
        }

        let depth = plan.context.len();
        let base = min_depth(&wanted);

        let script: Vec<String> = plan
            .context
            .iter()
            .map(|line| (*line).to_string())
            .chain(wanted.iter().map(|line| {
                // the parser reads these one column shallower than written
                let shift = usize::from(config.is_minus_one_indent(line.body()));
                let indent = " ".repeat(depth + line.depth() - base + shift);
                format!("{indent}{}", line.body())
            }))
            .chain(iter::repeat_n(EXIT, depth).map(str::to_string))
            .collect();

        debug!(
            replacement = ?plan.replacement,
            replaced = plan.current.len(),
            lines = script.len(),
            "generated edit script"
        );

        Ok(script)
    }

    fn plan(&self, designators: &[&str], desired: &Tree) -> Plan<'a> {
        let target = self.get(designators);

        if !target.is_present() {
            let point = self.deepest_match(designators);
            let point = if point.block() { point.subs() } else { point };
            return Plan {
                replacement: Replacement::Create,
                context: point.setcontext(),
                current: Vec::new(),
            };
        }

        if !target.block() {
            return Plan {
                replacement: Replacement::Line,
                context: target.setcontext(),
                current: target.subtree(),
            };
        }

        if restates_header(&target, desired) {
            Plan {
                replacement: Replacement::Block,
                context: target.setcontext(),
                current: merged_block(&target),
            }
        } else {
            let content = target.subs();
            Plan {
                replacement: Replacement::BlockContent,
                context: content.setcontext(),
                current: content.subtree(),
            }
        }
    }

    /// The last selection reached while matching `designators` one at a time.
    fn deepest_match(&self, designators: &[&str]) -> Self {
        let mut point = self.clone();
        for designator in designators {
            let next = point.get(&[*designator]);
            if !next.is_present() {
                break;
            }
            point = next;
        }
        point
    }
}

/// Whether the desired text is a single top-level line spelling one of the
/// target's headers, with its block below it.
fn restates_header(target: &Selection<'_>, desired: &Tree) -> bool {
    match desired.root().lines().as_slice() {
        [header] => target
            .lines()
            .iter()
            .any(|line| line.words() == header.words()),
        _ => false,
    }
}

/// The target's records with repeated headers dropped.
///
/// Headers with identical words share one nested block, so the block is
/// compared as if it had been written under the first header only.
fn merged_block<'a>(target: &Selection<'a>) -> Vec<&'a LineRecord> {
    let tree = target.tree();
    let repeated: Vec<&LineRecord> = target
        .nodes()
        .into_iter()
        .flat_map(move |node| {
            tree.node(node)
                .terminal
                .iter()
                .skip(1)
                .map(move |id| tree.record(*id))
        })
        .collect();

    target
        .subtree()
        .into_iter()
        .filter(|line| !repeated.iter().any(|header| ptr::eq(*header, *line)))
        .collect()
}

fn min_depth(lines: &[&LineRecord]) -> usize {
    lines.iter().map(|line| line.depth()).min().unwrap_or(0)
}

fn normalize<'r>(lines: &[&'r LineRecord]) -> Vec<(usize, bool, &'r [String])> {
    let base = min_depth(lines);
    lines.iter().copied().map(|line| line.key(base)).collect()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use crate::{Config, Replacement, Selection, Tree};

    const CONFIG: &str = "\
interface Serial0
 ip address 1.1.1.1 255.255.255.0
 no cdp enable
!
router bgp 65000
 address-family ipv4
  neighbor 10.0.0.1 activate
 exit-address-family
!
ip route 10.0.0.0 255.0.0.0 1.1.1.1
ip route 20.0.0.0 255.0.0.0 1.1.1.1
!
";

    fn tree(text: &str) -> Tree {
        Tree::from_lines(text.lines(), &Config::default()).unwrap()
    }

    fn replacement(selection: &Selection<'_>, designators: &[&str], desired: &str) -> Replacement {
        let desired = tree(desired);
        selection.plan(designators, &desired).replacement
    }

    #[test]
    fn unchanged_line_needs_no_edit() {
        let tree = tree("interface Serial0\n ip address 1.1.1.1 255.255.255.0\n!\n");
        let address = tree.get(&["interface Serial0", "ip address"]);

        assert!(address.set(&[], " ip address 1.1.1.1 255.255.255.0").unwrap().is_empty());
        assert!(address.set(&[], "ip  address 1.1.1.1   255.255.255.0  ").unwrap().is_empty());
    }

    #[test]
    fn changed_line_is_restated_in_context() {
        let tree = tree("interface Serial0\n ip address 1.1.1.1 255.255.255.0\n!\n");
        let address = tree.get(&["interface Serial0", "ip address"]);

        let expected = [
            "interface Serial0",
            " ip address 2.2.2.2 255.255.255.0",
            "exit",
        ];
        assert_eq!(address.set(&[], " ip address 2.2.2.2 255.255.255.0").unwrap(), expected);
        assert_eq!(
            tree.root()
                .set(&["interface Serial0", "ip address"], "ip address 2.2.2.2 255.255.255.0")
                .unwrap(),
            expected
        );
    }

    #[test]
    fn missing_line_is_created_under_header() {
        let tree = tree(CONFIG);
        let interface = tree.get(&["interface Serial0"]);

        assert_eq!(
            interface.set(&["shutdown"], "shutdown").unwrap(),
            ["interface Serial0", " shutdown", "exit"]
        );
        assert_eq!(replacement(&interface, &["shutdown"], "shutdown"), Replacement::Create);
    }

    #[test]
    fn missing_top_level_line_is_created_without_context() {
        let tree = tree(CONFIG);

        assert_eq!(
            tree.root().set(&["hostname"], "hostname r2").unwrap(),
            ["hostname r2"]
        );
    }

    #[test]
    fn missing_line_is_created_where_the_path_ends() {
        let tree = tree(CONFIG);
        let root = tree.root();

        assert_eq!(
            root.set(&["interface Serial0", "shutdown"], "shutdown").unwrap(),
            ["interface Serial0", " shutdown", "exit"]
        );
        assert_eq!(
            root.set(
                &["router bgp 65000", "address-family ipv6"],
                "address-family ipv6\n neighbor 10.0.0.1 activate\n",
            )
            .unwrap(),
            [
                "router bgp 65000",
                " address-family ipv6",
                "  neighbor 10.0.0.1 activate",
                "exit",
            ]
        );
        assert_eq!(
            replacement(&root, &["interface Serial0", "shutdown"], "shutdown"),
            Replacement::Create
        );
    }

    #[test]
    fn nested_lines_enter_every_block() {
        let tree = tree(CONFIG);

        assert_eq!(
            tree.root()
                .set(
                    &["router bgp 65000", "address-family ipv4", "neighbor"],
                    "neighbor 10.0.0.2 activate",
                )
                .unwrap(),
            [
                "router bgp 65000",
                " address-family ipv4",
                "  neighbor 10.0.0.2 activate",
                "exit",
                "exit",
            ]
        );
    }

    #[test]
    fn restated_header_replaces_whole_block() {
        let tree = tree(CONFIG);
        let root = tree.root();
        let desired = "interface Serial0\n description new\n ip address 1.1.1.1 255.255.255.0\n";

        assert_eq!(
            replacement(&root, &["interface Serial0"], desired),
            Replacement::Block
        );
        assert_eq!(
            root.set(&["interface Serial0"], desired).unwrap(),
            [
                "interface Serial0",
                " description new",
                " ip address 1.1.1.1 255.255.255.0",
            ]
        );

        let unchanged = "interface Serial0\n ip address 1.1.1.1 255.255.255.0\n no cdp enable\n";
        assert!(root.set(&["interface Serial0"], unchanged).unwrap().is_empty());
    }

    #[test]
    fn block_content_is_replaced_under_header() {
        let tree = tree(CONFIG);
        let root = tree.root();
        let desired = "description new\nip address 1.1.1.1 255.255.255.0\n";

        assert_eq!(
            replacement(&root, &["interface Serial0"], desired),
            Replacement::BlockContent
        );
        assert_eq!(
            root.set(&["interface Serial0"], desired).unwrap(),
            [
                "interface Serial0",
                " description new",
                " ip address 1.1.1.1 255.255.255.0",
                "exit",
            ]
        );

        let unchanged = " ip address 1.1.1.1 255.255.255.0\n no cdp enable\n";
        assert!(root.set(&["interface Serial0"], unchanged).unwrap().is_empty());
    }

    const POLICY: &str = "\
policy-map QOS
 description q
  class VOICE
   priority 100
!
";

    #[test]
    fn class_lines_are_written_one_column_deeper() {
        let tree = tree(POLICY);
        let root = tree.root();

        let script = root
            .set(&["policy-map QOS", "class VOICE"], "class VOICE\n priority 200\n")
            .unwrap();
        assert_eq!(
            script,
            ["policy-map QOS", "  class VOICE", "  priority 200", "exit"]
        );

        let applied = self::tree(&script.join("\n"));
        assert!(applied.get(&["policy-map QOS", "class VOICE", "priority 200"]).is_present());
        assert!(
            applied
                .root()
                .set(&["policy-map QOS", "class VOICE"], "class VOICE\n priority 200\n")
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn class_lines_in_block_content_stay_in_block() {
        let tree = tree(POLICY);
        let desired = " description q\n  class VOICE\n   priority 200\n";

        let script = tree.root().set(&["policy-map QOS"], desired).unwrap();
        assert_eq!(
            script,
            [
                "policy-map QOS",
                " description q",
                "  class VOICE",
                "  priority 200",
                "exit",
            ]
        );

        let applied = self::tree(&script.join("\n"));
        assert!(applied.root().set(&["policy-map QOS"], desired).unwrap().is_empty());
    }

    #[test]
    fn disabled_adjustment_writes_plain_indentation() {
        let config = Config::with_minus_one_indent(None).unwrap();
        let text = "policy-map QOS\n class VOICE\n  priority 100\n";
        let tree = Tree::from_lines(text.lines(), &config).unwrap();
        let desired = "class VOICE\n priority 200\n";

        let script = tree
            .root()
            .set(&["policy-map QOS", "class VOICE"], desired)
            .unwrap();
        assert_eq!(
            script,
            ["policy-map QOS", " class VOICE", "  priority 200", "exit"]
        );

        let applied = Tree::from_lines(script.iter(), &config).unwrap();
        assert!(
            applied
                .root()
                .set(&["policy-map QOS", "class VOICE"], desired)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn custom_pattern_shifts_matching_lines() {
        let config = Config::with_minus_one_indent(Some("^member ")).unwrap();
        let tree = Tree::from_lines(["group A", "  member x"], &config).unwrap();

        let script = tree.root().set(&["group A"], "member y").unwrap();
        assert_eq!(script, ["group A", "  member y", "exit"]);

        let applied = Tree::from_lines(script.iter(), &config).unwrap();
        assert_eq!(applied.get(&["group A", "member y"]).text(), ["  member y"]);
    }

    #[test]
    fn repeated_headers_compare_as_one_block() {
        let tree = tree("interface A\n x\n!\ninterface A\n y\n!\n");
        let root = tree.root();
        let desired = "interface A\n x\n y\n";

        assert_eq!(replacement(&root, &["interface A"], desired), Replacement::Block);
        assert!(root.set(&["interface A"], desired).unwrap().is_empty());
        assert_eq!(
            root.set(&["interface A"], "interface A\n x\n").unwrap(),
            ["interface A", " x"]
        );
    }

    #[test]
    fn negation_is_a_difference() {
        let tree = tree(CONFIG);
        let root = tree.root();

        assert_eq!(
            root.set(&["interface Serial0", "cdp enable"], "cdp enable").unwrap(),
            ["interface Serial0", " cdp enable", "exit"]
        );
        assert!(
            root.set(&["interface Serial0", "cdp enable"], "no cdp enable")
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn ambiguous_target_compares_every_line() {
        let tree = tree(CONFIG);
        let routes = "ip route 10.0.0.0 255.0.0.0 1.1.1.1\nip route 20.0.0.0 255.0.0.0 1.1.1.1\n";

        assert!(tree.root().set(&["ip route"], routes).unwrap().is_empty());
        assert_eq!(
            tree.root()
                .set(&["ip route"], "ip route 10.0.0.0 255.0.0.0 1.1.1.1")
                .unwrap(),
            ["ip route 10.0.0.0 255.0.0.0 1.1.1.1"]
        );
    }

    #[test]
    fn comments_in_desired_text_are_ignored() {
        let tree = tree(CONFIG);

        assert!(
            tree.root()
                .set(
                    &["interface Serial0", "ip address"],
                    "! address\nip address 1.1.1.1 255.255.255.0\n!\n",
                )
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn malformed_desired_text_is_an_error() {
        let tree = tree(CONFIG);
        let error = tree.root().set(&["interface Serial0"], "a\n  b\n c\n").unwrap_err();

        let crate::ParseError::MalformedIndent { line, .. } = error;
        assert_eq!(line, 3);
    }

    #[test_case(&["interface Serial0", "ip address"], "ip address 2.2.2.2 255.255.255.0"; "changed line")]
    #[test_case(&["interface Serial0", "shutdown"], "shutdown"; "created line")]
    #[test_case(&["interface Serial0"], "interface Serial0\n description new\n"; "whole block")]
    #[test_case(&["interface Serial0"], "description new\n"; "block content")]
    #[test_case(&["router bgp 65000", "address-family ipv4", "neighbor"], "neighbor 10.0.0.2 activate"; "nested line")]
    #[test_case(&["router bgp 65000", "address-family ipv6"], "address-family ipv6\n neighbor 10.0.0.1 activate"; "created block")]
    fn applying_the_edit_is_idempotent(designators: &[&str], desired: &str) {
        let script = tree(CONFIG).root().set(designators, desired).unwrap();
        assert!(!script.is_empty());

        let applied = tree(&script.join("\n"));
        assert!(applied.root().set(designators, desired).unwrap().is_empty());
    }
}
