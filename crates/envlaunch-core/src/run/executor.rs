use std::fmt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use super::LaunchConfig;
use crate::error::{ErrorKind, Fallible, LaunchError};
use crate::fs::is_enterable;
use crate::signal::pass_control_to_target;
use log::debug;

/// Process builder for the target program
///
/// Standard input, output and error are inherited from the launcher.
pub struct LaunchCommand {
    command: Command,
    working_dir: PathBuf,
}

impl LaunchCommand {
    /// The underlying command, as it will be run
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Runs the command, returning the `ExitStatus` if it successfully launches
    ///
    /// A spawn failure is blamed on the working directory when it can no longer be entered,
    /// otherwise on the interpreter.
    pub fn execute(mut self) -> Fallible<ExitStatus> {
        debug!("Running {}", self);

        pass_control_to_target();
        let result = self.command.status();

        result.map_err(|error| {
            let kind = if is_enterable(&self.working_dir) {
                ErrorKind::TargetExecError {
                    command: self.to_string(),
                }
            } else {
                ErrorKind::LaunchDirAccessError {
                    dir: self.working_dir.clone(),
                }
            };

            LaunchError::from_source(error, kind)
        })
    }
}

impl From<LaunchConfig> for LaunchCommand {
    fn from(config: LaunchConfig) -> Self {
        let mut command = Command::new(&config.interpreter);
        command.arg(&config.entry_point);
        command.args(&config.args);
        command.current_dir(&config.working_dir);

        for (key, value) in &config.activation.vars {
            command.env(key, value);
        }
        for key in &config.activation.unset {
            command.env_remove(key);
        }

        LaunchCommand {
            command,
            working_dir: config.working_dir,
        }
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command.get_program().to_string_lossy())?;

        for arg in self.command.get_args() {
            write!(f, " {}", arg.to_string_lossy())?;
        }

        Ok(())
    }
}
