mod common;

use std::env;
use std::ffi::OsString;
use std::process::exit;

use common::{Error, IntoResult};
use envlaunch_core::error::{report_error, ExitCode};
use envlaunch_core::log::Logger;
use envlaunch_core::run::launch;
use envlaunch_core::signal::setup_signal_handler;
use log::debug;

/// Runs the target with the given arguments and returns the exit code to report
fn run(args: &[OsString]) -> i32 {
    match launch(args).into_result() {
        Ok(()) => ExitCode::Success as i32,
        Err(Error::Target(code)) => {
            debug!("Target exited with code {}", code);
            code
        }
        Err(Error::Launch(err)) => {
            report_error(env!("CARGO_PKG_VERSION"), &err);
            err.exit_code() as i32
        }
    }
}

pub fn main() {
    Logger::init().expect("Only a single Logger should be initialized");
    setup_signal_handler();

    let args: Vec<OsString> = env::args_os().skip(1).collect();
    exit(run(&args));
}
