use std::{path::PathBuf, process};

use clap::Parser;
use reconfig::{Config, Outcome, Selection};
use tracing::instrument;

use super::terminal::Palette;

#[derive(Debug, Parser)]
#[command(about = "Query the lines at a position")]
pub struct Get {
    /// Configuration file, or `-` for standard input
    file: PathBuf,

    /// Designators, matched one after another
    #[arg(required = true)]
    designators: Vec<String>,

    /// List the words that can follow the matched position instead
    #[arg(long)]
    kids: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Get {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let tree = super::load_tree(&self.file, config)?;
        let selection = tree.get(&super::designators(&self.designators));

        match self.output {
            OutputFormat::Pretty => self.output_pretty(&selection),
            OutputFormat::Json => Self::output_json(&selection)?,
        }

        if selection.outcome() == Outcome::Absent {
            process::exit(1);
        }

        Ok(())
    }

    fn output_pretty(&self, selection: &Selection<'_>) {
        match selection.outcome() {
            Outcome::Absent => {
                eprintln!("{}", Palette::stderr().notice("no match"));
                return;
            }
            Outcome::Ambiguous => {
                let message = format!("ambiguous: {} lines match", selection.text().len());
                eprintln!("{}", Palette::stderr().notice(&message));
            }
            Outcome::Found => {}
        }

        if self.kids {
            for kid in selection.kids() {
                println!("{}", kid.word().unwrap_or_default());
            }
        } else {
            for line in selection.text() {
                println!("{line}");
            }
        }
    }

    fn output_json(selection: &Selection<'_>) -> anyhow::Result<()> {
        use serde_json::json;

        let outcome = match selection.outcome() {
            Outcome::Found => "found",
            Outcome::Ambiguous => "ambiguous",
            Outcome::Absent => "absent",
        };

        let lines: Vec<_> = selection
            .lines()
            .into_iter()
            .map(|line| {
                json!({
                    "text": line.text(),
                    "depth": line.depth(),
                    "negated": line.is_negated(),
                    "block": line.opens_block(),
                })
            })
            .collect();

        let kids: Vec<_> = selection
            .all(None)
            .iter()
            .filter_map(Selection::word)
            .collect();

        let output = json!({
            "outcome": outcome,
            "words": selection.words(),
            "context": selection.setcontext(),
            "lines": lines,
            "kids": kids,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
