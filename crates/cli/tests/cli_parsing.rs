use clap::Parser;
use std::path::PathBuf;
use todo_daemon::commands::tasks::TasksCommands;
use todo_daemon::formatters::OutputFormat;
use todo_daemon::{Cli, Commands};

#[test]
fn test_run_flags() {
    let cli = Cli::try_parse_from([
        "todo-daemon",
        "--sock",
        "/tmp/t.sock",
        "run",
        "--lock",
        "/tmp/t.lock",
        "--seed-demo-tasks",
    ])
    .unwrap();

    assert_eq!(cli.sock, Some(PathBuf::from("/tmp/t.sock")));
    match cli.command {
        Commands::Run {
            lock,
            config,
            seed_demo_tasks,
        } => {
            assert_eq!(lock, Some(PathBuf::from("/tmp/t.lock")));
            assert_eq!(config, None);
            assert!(seed_demo_tasks);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_status_defaults_to_json() {
    let cli = Cli::try_parse_from(["todo-daemon", "status"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Status {
            format: OutputFormat::Json
        }
    ));

    let cli = Cli::try_parse_from(["todo-daemon", "status", "--format", "text"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Status {
            format: OutputFormat::Text
        }
    ));

    assert!(Cli::try_parse_from(["todo-daemon", "status", "--format", "xml"]).is_err());
}

#[test]
fn test_global_sock_after_subcommand() {
    let cli = Cli::try_parse_from(["todo-daemon", "tasks", "list", "--sock", "/tmp/x.sock"]).unwrap();
    assert_eq!(cli.sock, Some(PathBuf::from("/tmp/x.sock")));
    assert!(matches!(
        cli.command,
        Commands::Tasks {
            command: TasksCommands::List
        }
    ));
}

#[test]
fn test_tasks_add_joins_words() {
    let cli = Cli::try_parse_from(["todo-daemon", "tasks", "add", "buy", "milk"]).unwrap();
    match cli.command {
        Commands::Tasks {
            command: TasksCommands::Add { summary },
        } => assert_eq!(summary.join(" "), "buy milk"),
        other => panic!("unexpected command {other:?}"),
    }

    assert!(Cli::try_parse_from(["todo-daemon", "tasks", "add"]).is_err());
}

#[test]
fn test_tasks_done_and_remove_require_id() {
    let cli = Cli::try_parse_from(["todo-daemon", "t", "done", "3"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Tasks {
            command: TasksCommands::Done { ref id }
        } if id == "3"
    ));

    let cli = Cli::try_parse_from(["todo-daemon", "tasks", "rm", "4"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Tasks {
            command: TasksCommands::Remove { ref id }
        } if id == "4"
    ));

    assert!(Cli::try_parse_from(["todo-daemon", "tasks", "done"]).is_err());
}

#[test]
fn test_missing_command_is_an_error() {
    assert!(Cli::try_parse_from(["todo-daemon"]).is_err());
    assert!(Cli::try_parse_from(["todo-daemon", "frobnicate"]).is_err());
}
