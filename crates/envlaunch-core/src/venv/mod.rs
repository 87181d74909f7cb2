//! Activation of the Python virtual environment that sits next to the launcher.
//!
//! Activation does what sourcing `venv/bin/activate` does to a shell, but the
//! changes are collected into an [`Activation`] and applied to the target's
//! `Command` only. The launcher's own environment is never modified.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Context, ErrorKind, Fallible};
use crate::fs::read_file;
use crate::layout::{venv_bin_dir, LaunchLayout};
use log::{debug, warn};

mod serial;

pub use serial::VenvConfig;

const VIRTUAL_ENV: &str = "VIRTUAL_ENV";
const VIRTUAL_ENV_PROMPT: &str = "VIRTUAL_ENV_PROMPT";
const PYTHONHOME: &str = "PYTHONHOME";
const PATH: &str = "PATH";

/// A provisioned virtual environment
#[derive(Debug)]
pub struct VirtualEnv {
    root: PathBuf,
    bin_dir: PathBuf,
    interpreter: PathBuf,
    config: VenvConfig,
}

/// The environment changes that activating a virtual environment applies to the target
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Activation {
    /// Variables to set, in order
    pub vars: Vec<(&'static str, OsString)>,
    /// Variables to remove
    pub unset: Vec<&'static str>,
}

impl VirtualEnv {
    /// Loads and validates the virtual environment for the given layout
    ///
    /// Checks, in order, that the environment directory, its `pyvenv.cfg`, and its interpreter
    /// all exist, so that the error names the first missing artifact.
    pub fn load(layout: &LaunchLayout) -> Fallible<Self> {
        let root = layout.venv_dir();
        if !root.is_dir() {
            return Err(ErrorKind::VenvNotFound {
                venv: root.to_owned(),
            }
            .into());
        }

        let config = load_config(layout.venv_config_file())?;

        let interpreter = layout.venv_interpreter();
        if !interpreter.is_file() {
            return Err(ErrorKind::VenvInterpreterNotFound {
                interpreter: interpreter.to_owned(),
            }
            .into());
        }

        debug!(
            "Found virtual environment at {} (Python {})",
            root.display(),
            config.version.as_deref().unwrap_or("unknown version")
        );

        Ok(VirtualEnv {
            root: root.to_owned(),
            bin_dir: layout.venv_bin_dir().to_owned(),
            interpreter: interpreter.to_owned(),
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    pub fn config(&self) -> &VenvConfig {
        &self.config
    }

    /// The prompt set by `--prompt` when the environment was created, or its directory name
    pub fn prompt(&self) -> OsString {
        match &self.config.prompt {
            Some(prompt) => prompt.into(),
            None => self
                .root
                .file_name()
                .map(|name| name.to_os_string())
                .unwrap_or_default(),
        }
    }

    /// Computes the environment changes for running a program inside this virtual environment
    pub fn activation(&self) -> Activation {
        let mut vars = vec![
            (VIRTUAL_ENV, self.root.clone().into_os_string()),
            (VIRTUAL_ENV_PROMPT, self.prompt()),
        ];

        match self.path() {
            Some(path) => {
                debug!("PATH: {}", path.to_string_lossy());
                vars.push((PATH, path));
            }
            None => warn!(
                "Could not add {} to PATH, the pipeline will run with the current PATH",
                self.bin_dir.display()
            ),
        }

        Activation {
            vars,
            unset: vec![PYTHONHOME],
        }
    }

    /// Produces a modified version of the current `PATH` environment variable that finds the
    /// virtual environment's executables first.
    ///
    /// If a different virtual environment is already active, its bin directory is removed, the
    /// same as `deactivate` would do before activating another environment.
    ///
    /// Returns `None` when the bin directory cannot be placed on PATH, e.g. it contains the
    /// separator character.
    fn path(&self) -> Option<OsString> {
        let old_path = envoy::path().unwrap_or_else(|| envoy::Var::from(""));
        let mut new_path = old_path.split().remove(self.bin_dir.clone());

        if let Some(previous) = env::var_os(VIRTUAL_ENV) {
            let previous_bin = venv_bin_dir(Path::new(&previous));
            debug!(
                "Removing previously active environment from PATH: {}",
                previous_bin.display()
            );
            new_path = new_path.remove(previous_bin);
        }

        new_path.prefix(vec![self.bin_dir.clone()]).join().ok()
    }
}

fn load_config(file: &Path) -> Fallible<VenvConfig> {
    let contents = read_file(file)
        .with_context(|| ErrorKind::VenvConfigReadError {
            file: file.to_owned(),
        })?
        .ok_or_else(|| ErrorKind::VenvConfigNotFound {
            file: file.to_owned(),
        })?;

    serial::RawVenvConfig::parse(&contents)
        .and_then(serial::RawVenvConfig::into_config)
        .map_err(|reason| {
            ErrorKind::InvalidVenvConfig {
                file: file.to_owned(),
                reason,
            }
            .into()
        })
}
