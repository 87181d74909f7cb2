use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::error::{ErrorKind, ExitCode, Fallible};
use crate::layout::{entry_point, launch_layout, LaunchLayout};
use crate::venv::{Activation, VirtualEnv};
use log::debug;

mod executor;

pub use executor::LaunchCommand;

/// Launch the target program with the provided arguments
///
/// Runs every step of the launch in order: locate the launcher, check the launch directory,
/// activate the virtual environment, then run the entry point and wait for it to finish.
pub fn launch(args: &[OsString]) -> Fallible<ExitStatus> {
    let layout = launch_layout()?;
    debug!("Launch directory: {}", layout.root().display());

    layout.ensure_accessible()?;
    let venv = VirtualEnv::load(layout)?;

    LaunchConfig::new(layout, &venv, args)?.into_command().execute()
}

/// Everything needed to run the target program, collected before anything is executed
#[derive(Debug)]
pub struct LaunchConfig {
    /// Directory the target runs in
    pub working_dir: PathBuf,
    /// The virtual environment's interpreter
    pub interpreter: PathBuf,
    /// Entry point script, relative to `working_dir`
    pub entry_point: PathBuf,
    /// Caller-supplied arguments, passed through untouched
    pub args: Vec<OsString>,
    /// Environment changes from activating the virtual environment
    pub activation: Activation,
}

impl LaunchConfig {
    pub fn new(layout: &LaunchLayout, venv: &VirtualEnv, args: &[OsString]) -> Fallible<Self> {
        let activation = venv.activation();

        if !layout.entry_point_file().is_file() {
            return Err(ErrorKind::TargetNotFound {
                entry: layout.entry_point_file().to_owned(),
            }
            .into());
        }

        Ok(LaunchConfig {
            working_dir: layout.root().to_owned(),
            interpreter: venv.interpreter().to_owned(),
            entry_point: entry_point(),
            args: args.to_vec(),
            activation,
        })
    }

    pub fn into_command(self) -> LaunchCommand {
        LaunchCommand::from(self)
    }
}

/// The exit code the launcher should report for the target's exit status
///
/// A target killed by a signal reports `128 + signal`, matching shell conventions.
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or_else(|| signal_exit_code(status))
}

#[cfg(unix)]
fn signal_exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .signal()
        .map(|signal| 128 + signal)
        .unwrap_or(ExitCode::UnknownError as i32)
}

#[cfg(not(unix))]
fn signal_exit_code(_status: ExitStatus) -> i32 {
    ExitCode::UnknownError as i32
}
