//! `reconf`: query indentation-structured device configurations and print
//! the lines needed to change them.

mod cli;

use clap::Parser;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
