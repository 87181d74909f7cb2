//! The fixed directory layout around the launcher executable.
//!
//! Everything the launcher touches is found relative to the directory that
//! contains the launcher itself:
//!
//! ```text
//! <launch dir>/
//!     envlaunch
//!     venv/
//!         pyvenv.cfg
//!         bin/python            (Scripts\python.exe on Windows)
//!     scripts/
//!         main.py
//!     logs/
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Context, ErrorKind, Fallible};
use cfg_if::cfg_if;
use dunce::canonicalize;
use once_cell::sync::OnceCell;

cfg_if! {
    if #[cfg(unix)] {
        mod unix;
        pub use unix::*;
    } else if #[cfg(windows)] {
        mod windows;
        pub use windows::*;
    }
}

macro_rules! path_buf {
    ($base:expr, $( $x:expr ), *) => {
        {
            let mut temp = $base;
            $(
                temp.push($x);
            )*
            temp
        }
    }
}

const VENV_DIR: &str = "venv";
const VENV_CONFIG_FILE: &str = "pyvenv.cfg";
const SCRIPTS_DIR: &str = "scripts";
const ENTRY_POINT_FILE: &str = "main.py";
const LOG_DIR: &str = "logs";

static LAUNCH_LAYOUT: OnceCell<LaunchLayout> = OnceCell::new();

/// The layout anchored at the running launcher's own directory
pub fn launch_layout<'a>() -> Fallible<&'a LaunchLayout> {
    LAUNCH_LAYOUT.get_or_try_init(|| default_launch_dir().map(LaunchLayout::new))
}

/// Determine the launch directory from the currently running executable
///
/// Note that we need to canonicalize the path we get from current_exe to make sure we resolve
/// symlinks and find the actual launcher binary
fn default_launch_dir() -> Fallible<PathBuf> {
    env::current_exe()
        .and_then(canonicalize)
        .map(|mut path| {
            path.pop(); // Remove the executable name from the path
            path
        })
        .with_context(|| ErrorKind::NoLaunchDir)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchLayout {
    root: PathBuf,
    venv_dir: PathBuf,
    venv_config_file: PathBuf,
    venv_bin_dir: PathBuf,
    venv_interpreter: PathBuf,
    entry_point_file: PathBuf,
    log_dir: PathBuf,
}

impl LaunchLayout {
    pub fn new(root: PathBuf) -> Self {
        let venv_dir = path_buf!(root.clone(), VENV_DIR);
        let venv_bin_dir = venv_bin_dir(&venv_dir);

        LaunchLayout {
            venv_config_file: path_buf!(venv_dir.clone(), VENV_CONFIG_FILE),
            venv_interpreter: path_buf!(venv_bin_dir.clone(), interpreter_file()),
            entry_point_file: path_buf!(root.clone(), entry_point()),
            log_dir: path_buf!(root.clone(), LOG_DIR),
            venv_bin_dir,
            venv_dir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn venv_dir(&self) -> &Path {
        &self.venv_dir
    }

    pub fn venv_config_file(&self) -> &Path {
        &self.venv_config_file
    }

    pub fn venv_bin_dir(&self) -> &Path {
        &self.venv_bin_dir
    }

    pub fn venv_interpreter(&self) -> &Path {
        &self.venv_interpreter
    }

    pub fn entry_point_file(&self) -> &Path {
        &self.entry_point_file
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Verifies that the launch directory can be used as the target's working directory
    ///
    /// Only entering the directory is required, so a directory that cannot be listed is fine.
    pub fn ensure_accessible(&self) -> Fallible<()> {
        let metadata = fs::metadata(&self.root).with_context(|| self.access_error())?;

        if metadata.is_dir() {
            Ok(())
        } else {
            Err(self.access_error().into())
        }
    }

    fn access_error(&self) -> ErrorKind {
        ErrorKind::LaunchDirAccessError {
            dir: self.root.clone(),
        }
    }
}

/// The entry point, relative to the launch directory, as it is passed to the interpreter
pub fn entry_point() -> PathBuf {
    path_buf!(PathBuf::from(SCRIPTS_DIR), ENTRY_POINT_FILE)
}

/// The bin directory of any virtual environment rooted at `venv`
pub fn venv_bin_dir(venv: &Path) -> PathBuf {
    path_buf!(venv.to_path_buf(), VENV_BIN_DIR)
}

fn interpreter_file() -> String {
    format!("{}{}", INTERPRETER_NAME, env::consts::EXE_SUFFIX)
}
