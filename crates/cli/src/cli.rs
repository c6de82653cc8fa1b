use crate::commands::Commands;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "todo-daemon")]
#[command(about = "A daemon for managing a to-do list", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the RPC socket file
    #[arg(long, global = true, value_name = "PATH")]
    pub sock: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
