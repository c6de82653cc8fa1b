use crate::formatters::print_tasks;
use clap::Subcommand;
use std::path::Path;
use todo_daemon_core::{Result, ResultExt};

#[derive(Debug, Subcommand)]
pub enum TasksCommands {
    /// Add a new task to the to-do list
    Add {
        /// Summary of the new task
        #[arg(required = true, num_args = 1..)]
        summary: Vec<String>,
    },
    /// List all tasks in the to-do list
    #[command(visible_alias = "ls")]
    List,
    /// Mark a task as done
    Done {
        /// ID of the task
        id: String,
    },
    /// Remove a task from the to-do list
    #[command(visible_alias = "rm")]
    Remove {
        /// ID of the task
        id: String,
    },
}

impl TasksCommands {
    /// Run the command and print the resulting list
    pub async fn execute(self, sock: &Path) -> Result<()> {
        let mut client = super::connect(sock).await?;

        match self {
            TasksCommands::Add { summary } => {
                client
                    .create_task(&summary.join(" "))
                    .await
                    .context("cannot create task")?;
            }
            TasksCommands::List => {}
            TasksCommands::Done { id } => {
                client
                    .complete_task(&id)
                    .await
                    .context("cannot complete task")?;
            }
            TasksCommands::Remove { id } => {
                client
                    .delete_task(&id)
                    .await
                    .context("cannot remove task")?;
            }
        }

        let tasks = client
            .list_tasks()
            .await
            .context("cannot retrieve tasks")?;
        print_tasks(&tasks)
    }
}
