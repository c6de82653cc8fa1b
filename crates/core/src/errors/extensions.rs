//! Extension traits for error handling

use super::types::{Error, Result};

/// Extension trait for adding operation context to Results
pub trait ResultExt<T> {
    /// Annotate the error with the operation that failed
    fn context(self, operation: impl Into<String>) -> Result<T>;

    /// Annotate the error with a lazily built operation description
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, operation: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Context {
            operation: operation.into(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::Context {
            operation: f(),
            source: Box::new(e.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_context_keeps_kind() {
        let result: Result<()> = Err(Error::task_not_found("7"));
        let err = result.context("update task '7'").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "update task '7': no such task: 7");
    }

    #[test]
    fn test_with_context_is_lazy() {
        let result: Result<u8> = Ok(1);
        let value = result
            .with_context(|| panic!("context must not be built on success"))
            .unwrap();
        assert_eq!(value, 1);
    }

    #[test]
    fn test_rpc_codes_round_trip_kinds() {
        for kind in [
            ErrorKind::InvalidArgument,
            ErrorKind::NotFound,
            ErrorKind::Unavailable,
            ErrorKind::Internal,
        ] {
            assert_eq!(ErrorKind::from_rpc_code(kind.rpc_code()), kind);
        }
        assert_eq!(
            Error::rpc(-32601, "Method not found").kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_multiple_unwraps_single_error() {
        let err = Error::multiple(vec![Error::internal("boom")]);
        assert!(matches!(err, Error::Internal { .. }));

        let err = Error::multiple(vec![
            Error::network("unix:/tmp/x.sock", "accept failed"),
            Error::internal("boom"),
        ]);
        assert_eq!(
            err.to_string(),
            "network error for 'unix:/tmp/x.sock': accept failed; internal error: boom"
        );
    }
}
