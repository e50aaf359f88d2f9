use std::{path::PathBuf, process};

use clap::Parser;
use reconfig::{Config, domain::EXIT};
use tracing::instrument;

use super::{STDIN, terminal::Palette};

#[derive(Debug, Parser)]
#[command(about = "Print the lines that bring a position into a desired state")]
pub struct Set {
    /// Configuration file, or `-` for standard input
    file: PathBuf,

    /// Designators naming the position, matched one after another
    designators: Vec<String>,

    /// File holding the desired text, or `-` for standard input
    #[arg(short, long)]
    desired: PathBuf,

    /// Exit with status 2 if the configuration differs
    #[arg(long)]
    check: bool,
}

impl Set {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        if self.file.as_os_str() == STDIN && self.desired.as_os_str() == STDIN {
            anyhow::bail!("the configuration and the desired text cannot both come from standard input");
        }

        let tree = super::load_tree(&self.file, config)?;
        let desired = super::read_text(&self.desired)?;
        let script = tree
            .root()
            .set(&super::designators(&self.designators), &desired)?;

        if script.is_empty() {
            eprintln!("{}", Palette::stderr().notice("already up to date"));
            return Ok(());
        }

        // every entered block is left again with one `exit`
        let depth = script.iter().rev().take_while(|line| *line == EXIT).count();
        let palette = Palette::stdout();
        for (index, line) in script.iter().enumerate() {
            if index < depth || index >= script.len() - depth {
                println!("{}", palette.context(line));
            } else {
                println!("{}", palette.added(line));
            }
        }

        if self.check {
            process::exit(2);
        }

        Ok(())
    }
}
