//! [`Error`]-related definitions.

use std::{fmt, process::ExitCode};

use derive_more::Error as StdError;
use service::{Categorize, ErrorKind};
use tracerr::{Trace, Traced};

/// Failure of a [`Command`] reported to the operator.
///
/// [`Command`]: crate::args::Command
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`ErrorKind`] of this [`Error`].
    pub kind: ErrorKind,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Creates a new [`Error`] of an infrastructure failure.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            kind: ErrorKind::Infrastructure,
            backtrace: None,
            message: msg.to_string(),
        }
    }

    /// Returns the process [`ExitCode`] matching this [`Error`].
    ///
    /// Rejected input exits with `2`, everything else with `1`.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self.kind {
            ErrorKind::Infrastructure => ExitCode::FAILURE,
            ErrorKind::NotFound
            | ErrorKind::InvalidRange
            | ErrorKind::InvalidValue
            | ErrorKind::Overlap
            | ErrorKind::AlreadyTerminal => ExitCode::from(2),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            kind,
            backtrace,
            message,
        } = self;

        write!(f, "[{kind}]: {message}")?;
        if let Some(trace) = backtrace {
            write!(f, "\n{trace}")?;
        }
        Ok(())
    }
}

impl<E> From<Traced<E>> for Error
where
    E: Categorize + fmt::Display,
{
    fn from(err: Traced<E>) -> Self {
        let (err, trace) = err.split();
        Self {
            kind: err.kind(),
            backtrace: Some(trace),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod spec {
    use std::process::ExitCode;

    use service::{query::report::profitability, ErrorKind};

    use super::Error;

    #[test]
    fn keeps_kind_of_traced_error() {
        let from = "2024-02-01".parse().unwrap();
        let to = "2024-01-01".parse().unwrap();
        let err: tracerr::Traced<_> = tracerr::new!(
            profitability::ExecutionError::InvalidRange { from, to }
        );

        let err = Error::from(err);

        assert_eq!(err.kind, ErrorKind::InvalidRange);
        assert_eq!(err.exit_code(), ExitCode::from(2));
        assert!(err.to_string().starts_with("[INVALID_RANGE]: "));
    }

    #[test]
    fn infrastructure_failures_exit_with_one() {
        let err = Error::internal(&"connection refused");

        assert_eq!(err.kind, ErrorKind::Infrastructure);
        assert_eq!(err.exit_code(), ExitCode::FAILURE);
        assert_eq!(err.to_string(), "[INFRASTRUCTURE]: connection refused");
    }
}
