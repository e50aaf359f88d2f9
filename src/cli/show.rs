use std::{path::PathBuf, process};

use clap::Parser;
use reconfig::Config;
use tracing::instrument;

use super::terminal::Palette;

#[derive(Debug, Parser)]
#[command(about = "Print a configuration without comments")]
pub struct Show {
    /// Configuration file, or `-` for standard input
    file: PathBuf,

    /// Designators naming the part to print, matched one after another
    designators: Vec<String>,

    /// Also print the block headers that lead to the selected lines
    #[arg(long)]
    context: bool,
}

impl Show {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let tree = super::load_tree(&self.file, config)?;
        let selection = tree.get(&super::designators(&self.designators));

        if !selection.is_present() {
            let message = format!("'{}' not found", self.designators.join("' '"));
            eprintln!("{}", Palette::stderr().notice(&message));
            process::exit(1);
        }

        let palette = Palette::stdout();

        if self.context {
            for line in selection.setcontext() {
                println!("{}", palette.context(line));
            }
        }

        for line in selection.alltext() {
            println!("{line}");
        }

        if self.context {
            for line in selection.unsetcontext() {
                println!("{}", palette.context(line));
            }
        }

        Ok(())
    }
}
