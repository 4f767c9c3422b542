use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hoard",
    about = "Hoard: a content-addressed block store with pinning and garbage collection",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Repository directory
    #[arg(long, global = true, default_value = ".hoard")]
    pub repo: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new repository
    Init,
    /// Import a file into the block store
    Add(AddArgs),
    /// Manage pins
    Pin(PinArgs),
    /// Remove every block not reachable from a pin
    Gc(GcArgs),
    /// Show block and pin counts
    Stat,
}

#[derive(Args)]
pub struct AddArgs {
    pub path: PathBuf,
    /// Pin the imported content recursively (default)
    #[arg(long, overrides_with = "no_pin")]
    pub pin: bool,
    /// Leave the imported content unpinned
    #[arg(long, overrides_with = "pin")]
    pub no_pin: bool,
}

impl AddArgs {
    pub fn should_pin(&self) -> bool {
        !self.no_pin
    }
}

#[derive(Args)]
pub struct PinArgs {
    #[command(subcommand)]
    pub action: PinAction,
}

#[derive(Subcommand)]
pub enum PinAction {
    /// Pin a cid (recursively unless --direct)
    Add {
        cid: String,
        #[arg(long)]
        direct: bool,
    },
    /// Remove a pin
    Rm { cid: String },
    /// List pins
    Ls,
}

#[derive(Args)]
pub struct GcArgs {
    /// Also keep this root and whatever of its DAG is readable
    #[arg(long = "best-effort", value_name = "CID")]
    pub best_effort: Vec<String>,
    /// Print only the summary
    #[arg(short, long)]
    pub quiet: bool,
}
