use std::fmt;
use std::path::PathBuf;

use super::ExitCode;

const PERMISSIONS_CTA: &str = "Please ensure you have correct permissions to the launch directory.";

const PROVISION_CTA: &str = "Please create the virtual environment from the launch directory:

    python3 -m venv venv

and install the pipeline's dependencies into it.";

const RECREATE_CTA: &str = "The virtual environment appears to be damaged. Please remove the `venv`
directory and create it again with `python3 -m venv venv`.";

#[derive(Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub enum ErrorKind {
    /// Thrown when the containing directory could not be determined or created
    ContainingDirError {
        path: PathBuf,
    },

    /// Thrown when the error log file could not be created or written
    ErrorLogError {
        file: PathBuf,
    },

    /// Thrown when pyvenv.cfg exists but does not describe a usable virtual environment
    InvalidVenvConfig {
        file: PathBuf,
        reason: String,
    },

    /// Thrown when the launch directory is missing or cannot be entered
    LaunchDirAccessError {
        dir: PathBuf,
    },

    /// Thrown when the location of the running launcher could not be determined
    NoLaunchDir,

    /// Thrown when spawning the target program fails
    TargetExecError {
        command: String,
    },

    /// Thrown when the target program's entry point does not exist
    TargetNotFound {
        entry: PathBuf,
    },

    /// Thrown when the virtual environment has no pyvenv.cfg
    VenvConfigNotFound {
        file: PathBuf,
    },

    /// Thrown when pyvenv.cfg exists but cannot be read
    VenvConfigReadError {
        file: PathBuf,
    },

    /// Thrown when the virtual environment's Python interpreter is missing
    VenvInterpreterNotFound {
        interpreter: PathBuf,
    },

    /// Thrown when the virtual environment directory does not exist
    VenvNotFound {
        venv: PathBuf,
    },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::ContainingDirError { path } => write!(
                f,
                "Could not create the containing directory for {}

{}",
                path.display(),
                PERMISSIONS_CTA
            ),
            ErrorKind::ErrorLogError { file } => write!(
                f,
                "Could not write error log {}

{}",
                file.display(),
                PERMISSIONS_CTA
            ),
            ErrorKind::InvalidVenvConfig { file, reason } => write!(
                f,
                "Invalid virtual environment configuration in {}
{}

{}",
                file.display(),
                reason,
                RECREATE_CTA
            ),
            ErrorKind::LaunchDirAccessError { dir } => write!(
                f,
                "Could not enter launch directory {}

{}",
                dir.display(),
                PERMISSIONS_CTA
            ),
            ErrorKind::NoLaunchDir => write!(
                f,
                "Could not determine the directory containing the launcher.

Please ensure the launcher is run from a location that still exists."
            ),
            ErrorKind::TargetExecError { command } => write!(
                f,
                "Could not execute command '{}'

Please ensure the virtual environment's interpreter is executable.",
                command
            ),
            ErrorKind::TargetNotFound { entry } => write!(
                f,
                "Could not find program entry point {}

Please ensure the launcher is installed next to the `scripts` directory.",
                entry.display()
            ),
            ErrorKind::VenvConfigNotFound { file } => write!(
                f,
                "Virtual environment configuration not found at {}

{}",
                file.display(),
                PROVISION_CTA
            ),
            ErrorKind::VenvConfigReadError { file } => write!(
                f,
                "Could not read virtual environment configuration {}

{}",
                file.display(),
                PERMISSIONS_CTA
            ),
            ErrorKind::VenvInterpreterNotFound { interpreter } => write!(
                f,
                "Python interpreter not found at {}

{}",
                interpreter.display(),
                RECREATE_CTA
            ),
            ErrorKind::VenvNotFound { venv } => write!(
                f,
                "Virtual environment not found at {}

{}",
                venv.display(),
                PROVISION_CTA
            ),
        }
    }
}

impl ErrorKind {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ErrorKind::ContainingDirError { .. } => ExitCode::FileSystemError,
            ErrorKind::ErrorLogError { .. } => ExitCode::FileSystemError,
            ErrorKind::InvalidVenvConfig { .. } => ExitCode::EnvironmentError,
            ErrorKind::LaunchDirAccessError { .. } => ExitCode::FileSystemError,
            ErrorKind::NoLaunchDir => ExitCode::FileSystemError,
            ErrorKind::TargetExecError { .. } => ExitCode::ExecutionFailure,
            ErrorKind::TargetNotFound { .. } => ExitCode::ExecutableNotFound,
            ErrorKind::VenvConfigNotFound { .. } => ExitCode::EnvironmentError,
            ErrorKind::VenvConfigReadError { .. } => ExitCode::EnvironmentError,
            ErrorKind::VenvInterpreterNotFound { .. } => ExitCode::EnvironmentError,
            ErrorKind::VenvNotFound { .. } => ExitCode::EnvironmentError,
        }
    }
}
