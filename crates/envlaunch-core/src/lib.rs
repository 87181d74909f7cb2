//! The core of envlaunch: locating the launch directory, activating its Python virtual
//! environment and running the pipeline's entry point inside it.

pub mod error;
pub(crate) mod fs;
pub mod layout;
pub mod log;
pub mod run;
pub mod signal;
pub mod style;
pub mod venv;
