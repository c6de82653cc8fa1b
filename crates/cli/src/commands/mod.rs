use clap::Subcommand;
use std::path::{Path, PathBuf};
use todo_daemon_core::{Result, TODO_DAEMON_CONFIG_VAR};
use todo_daemon_server::{DaemonConfig, RpcAddress, TaskClient};
use tokio_util::sync::CancellationToken;

use crate::formatters::OutputFormat;

pub mod run;
pub mod status;
pub mod tasks;

use self::tasks::TasksCommands;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the to-do daemon in the foreground
    Run {
        /// Path to the lock file guarding against a second daemon
        #[arg(long, value_name = "PATH")]
        lock: Option<PathBuf>,

        /// Path to a JSON configuration file
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Start with a few demo tasks instead of an empty list
        #[arg(long)]
        seed_demo_tasks: bool,
    },

    /// Print the status of the running daemon
    Status {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Manage the tasks of the to-do list
    #[command(visible_alias = "t")]
    Tasks {
        #[command(subcommand)]
        command: TasksCommands,
    },
}

impl Commands {
    pub async fn execute(self, sock: Option<PathBuf>, shutdown: CancellationToken) -> Result<()> {
        match self {
            Commands::Run {
                lock,
                config,
                seed_demo_tasks,
            } => {
                let mut config = load_config(config)?;
                if let Some(sock) = sock {
                    config.sock_file = sock;
                }
                if let Some(lock) = lock {
                    config.lock_file = lock;
                }
                if seed_demo_tasks {
                    config.server.seed_demo_tasks = true;
                }
                run::execute(config, shutdown).await
            }
            Commands::Status { format } => {
                let sock = resolve_sock(sock)?;
                status::execute(&sock, format).await
            }
            Commands::Tasks { command } => {
                let sock = resolve_sock(sock)?;
                command.execute(&sock).await
            }
        }
    }
}

/// Load the configuration file named on the command line or in the
/// environment, falling back to the defaults
pub fn load_config(path: Option<PathBuf>) -> Result<DaemonConfig> {
    let path = path.or_else(|| std::env::var_os(TODO_DAEMON_CONFIG_VAR).map(PathBuf::from));
    DaemonConfig::load(path.as_deref())
}

fn resolve_sock(sock: Option<PathBuf>) -> Result<PathBuf> {
    match sock {
        Some(sock) => Ok(sock),
        None => Ok(load_config(None)?.sock_file),
    }
}

/// Connect to the daemon listening on `sock`
pub(crate) async fn connect(sock: &Path) -> Result<TaskClient> {
    let address = RpcAddress::parse("unix", &sock.to_string_lossy())?;
    TaskClient::connect(&address).await
}
