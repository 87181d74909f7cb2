use std::process::ExitStatus;

use envlaunch_core::error::LaunchError;
use envlaunch_core::run::exit_code;

pub enum Error {
    /// The launcher failed before or while starting the target
    Launch(LaunchError),
    /// The target ran and exited unsuccessfully with this code
    Target(i32),
}

pub trait IntoResult<T> {
    fn into_result(self) -> Result<T, Error>;
}

impl IntoResult<()> for Result<ExitStatus, LaunchError> {
    fn into_result(self) -> Result<(), Error> {
        match self {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(Error::Target(exit_code(status))),
            Err(err) => Err(Error::Launch(err)),
        }
    }
}
