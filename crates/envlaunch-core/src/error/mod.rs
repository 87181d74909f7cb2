use std::error::Error;
use std::fmt;

mod kind;
mod reporter;

pub use kind::ErrorKind;
pub use reporter::report_error;

pub type Fallible<T> = Result<T, LaunchError>;

/// Error type for the launcher
#[derive(Debug)]
pub struct LaunchError {
    inner: Box<Inner>,
}

#[derive(Debug)]
struct Inner {
    kind: ErrorKind,
    source: Option<Box<dyn Error>>,
}

impl LaunchError {
    /// The exit code the launcher should use when this error stops execution
    pub fn exit_code(&self) -> ExitCode {
        self.inner.kind.exit_code()
    }

    /// Create a new LaunchError instance including a source error
    pub fn from_source<E>(source: E, kind: ErrorKind) -> Self
    where
        E: Into<Box<dyn Error>>,
    {
        LaunchError {
            inner: Box::new(Inner {
                kind,
                source: Some(source.into()),
            }),
        }
    }

    /// Get a reference to the ErrorKind for this error
    pub fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.kind.fmt(f)
    }
}

impl Error for LaunchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source.as_ref().map(|b| b.as_ref())
    }
}

impl From<ErrorKind> for LaunchError {
    fn from(kind: ErrorKind) -> Self {
        LaunchError {
            inner: Box::new(Inner { kind, source: None }),
        }
    }
}

/// Trait providing the with_context method to easily convert any Result error into a LaunchError
pub trait Context<T> {
    fn with_context<F>(self, f: F) -> Fallible<T>
    where
        F: FnOnce() -> ErrorKind;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: Error + 'static,
{
    fn with_context<F>(self, f: F) -> Fallible<T>
    where
        F: FnOnce() -> ErrorKind,
    {
        self.map_err(|e| LaunchError::from_source(e, f()))
    }
}

/// Exit codes used when the launcher itself fails.
///
/// When the target program runs, its own exit code is used instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitCode {
    /// No error occurred.
    Success = 0,

    /// An unknown error occurred.
    UnknownError = 1,

    /// The virtual environment is missing or could not be activated.
    EnvironmentError = 6,

    /// A file or directory could not be located, read or written.
    FileSystemError = 7,

    /// The target program could not be run.
    ExecutionFailure = 126,

    /// The target program is not available.
    ExecutableNotFound = 127,
}
