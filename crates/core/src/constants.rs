/// Constants used throughout the to-do daemon codebase
// Runtime file names
pub const LOCK_FILE_NAME: &str = "todo-daemon.lock";
pub const SOCK_FILE_NAME: &str = "todo-daemon.sock";

// Environment variable names
pub const TODO_DAEMON_LOG_VAR: &str = "TODO_DAEMON_LOG";
pub const TODO_DAEMON_CONFIG_VAR: &str = "TODO_DAEMON_CONFIG";

// REST API layout
pub const API_BASE_PATH: &str = "/api";
pub const TASKS_COLLECTION_PATH: &str = "/v1/tasks";

// The HTTP listener always binds an ephemeral port on this host
pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";

// JSON-RPC version tag
pub const JSONRPC_VERSION: &str = "2.0";
