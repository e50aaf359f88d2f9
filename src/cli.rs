use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

mod get;
mod set;
mod show;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use get::Get;
use reconfig::{Config, Tree};
use set::Set;
use show::Show;

const STDIN: &str = "-";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Parser settings (TOML). Built-in defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = match &self.config {
            Some(path) => Config::load(path)
                .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", path.display()))?,
            None => Config::default(),
        };

        self.command.run(&config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Print a configuration, or the part of it under a position
    Show(Show),

    /// Query the lines at a position
    Get(Get),

    /// Print the lines that bring a position into a desired state
    ///
    /// Nothing is printed when the configuration already matches.
    Set(Set),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Show(command) => command.run(config)?,
            Self::Get(command) => command.run(config)?,
            Self::Set(command) => command.run(config)?,
        }
        Ok(())
    }
}

/// Loads a configuration file, or standard input for `-`.
fn load_tree(path: &Path, config: &Config) -> anyhow::Result<Tree> {
    if path == Path::new(STDIN) {
        return Tree::read(io::stdin().lock(), config).context("failed to read standard input");
    }
    Tree::load(path, config).with_context(|| format!("failed to load {}", path.display()))
}

/// Reads a whole file, or standard input for `-`.
fn read_text(path: &Path) -> anyhow::Result<String> {
    if path == Path::new(STDIN) {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read standard input")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn designators(designators: &[String]) -> Vec<&str> {
    designators.iter().map(String::as_str).collect()
}
