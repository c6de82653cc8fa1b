//! Core error type definitions

use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for to-do daemon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for to-do daemon operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or missing input
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The referenced task does not exist (any more)
    #[error("no such task: {id}")]
    TaskNotFound { id: String },

    /// The singleton lock is held by another daemon process
    #[error("another instance is already running (lock '{}' is held)", .lock_path.display())]
    AlreadyRunning { lock_path: PathBuf },

    /// Invariant violations inside the daemon
    #[error("internal error: {message}")]
    Internal { message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{}': {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Network-related errors (bind, connect, accept, transport)
    #[error("network error for '{endpoint}': {message}")]
    Network { endpoint: String, message: String },

    /// An error reported by the remote end of an RPC connection
    #[error("RPC error {code}: {message}")]
    Rpc { code: i32, message: String },

    /// Operation timeout errors
    #[error("operation '{operation}' timed out after {duration:?}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// An error annotated with the operation that produced it
    #[error("{operation}: {source}")]
    Context {
        operation: String,
        #[source]
        source: Box<Error>,
    },

    /// Several independent failures, e.g. from both listeners
    #[error("{}", join_messages(.0))]
    Multiple(Vec<Error>),
}

/// Coarse classification used when translating errors into protocol codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    AlreadyRunning,
    Unavailable,
    Internal,
}

impl Error {
    /// Classify this error, looking through any operation context
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument { .. } | Error::Json { .. } => ErrorKind::InvalidArgument,
            Error::TaskNotFound { .. } => ErrorKind::NotFound,
            Error::AlreadyRunning { .. } => ErrorKind::AlreadyRunning,
            Error::Network { .. } | Error::Timeout { .. } => ErrorKind::Unavailable,
            Error::Rpc { code, .. } => ErrorKind::from_rpc_code(*code),
            Error::Context { source, .. } => source.kind(),
            Error::Multiple(errors) => errors
                .first()
                .map(Error::kind)
                .unwrap_or(ErrorKind::Internal),
            Error::Internal { .. } | Error::FileSystem { .. } | Error::Configuration { .. } => {
                ErrorKind::Internal
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_already_running(&self) -> bool {
        self.kind() == ErrorKind::AlreadyRunning
    }
}

impl ErrorKind {
    /// JSON-RPC error code for invalid params
    pub const RPC_INVALID_PARAMS: i32 = -32602;
    /// JSON-RPC error code for internal errors
    pub const RPC_INTERNAL: i32 = -32603;
    /// Application-defined JSON-RPC code for missing resources
    pub const RPC_NOT_FOUND: i32 = -32004;
    /// Application-defined JSON-RPC code for a transient failure
    pub const RPC_UNAVAILABLE: i32 = -32014;

    pub fn rpc_code(self) -> i32 {
        match self {
            ErrorKind::InvalidArgument => Self::RPC_INVALID_PARAMS,
            ErrorKind::NotFound => Self::RPC_NOT_FOUND,
            ErrorKind::Unavailable => Self::RPC_UNAVAILABLE,
            ErrorKind::AlreadyRunning | ErrorKind::Internal => Self::RPC_INTERNAL,
        }
    }

    pub fn from_rpc_code(code: i32) -> Self {
        match code {
            Self::RPC_INVALID_PARAMS => ErrorKind::InvalidArgument,
            Self::RPC_NOT_FOUND => ErrorKind::NotFound,
            Self::RPC_UNAVAILABLE => ErrorKind::Unavailable,
            _ => ErrorKind::Internal,
        }
    }
}

fn join_messages(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
