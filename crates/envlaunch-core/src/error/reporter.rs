use std::env::args_os;
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use super::{Context, ErrorKind, Fallible, LaunchError};
use crate::fs::ensure_containing_dir_exists;
use crate::layout::launch_layout;
use crate::style::format_error_cause;
use chrono::Local;
use console::strip_ansi_codes;
use log::{debug, error, warn};

/// Report an error, both to the console and to the error log
pub fn report_error(launcher_version: &str, err: &LaunchError) {
    let message = err.to_string();
    error!("{}", message);

    if let Some(details) = compose_error_details(err) {
        debug!("{}", details);

        match write_error_log(launcher_version, message, details) {
            Ok(log_file) => {
                eprintln!("Error details written to {}", log_file.display());
            }
            Err(log_error) => {
                warn!("Unable to write error log: {}", log_error);
            }
        }
    }
}

/// Write an error log with additional details about the error
fn write_error_log(
    launcher_version: &str,
    message: String,
    details: String,
) -> Fallible<PathBuf> {
    let file_name = Local::now()
        .format("envlaunch-error-%Y-%m-%d_%H_%M_%S%.3f.log")
        .to_string();
    let log_file_path = launch_layout()?.log_dir().join(file_name);

    ensure_containing_dir_exists(&log_file_path)?;
    let mut log_file = File::create(&log_file_path).with_context(|| ErrorKind::ErrorLogError {
        file: log_file_path.clone(),
    })?;

    let contents = format!(
        "{}\nenvlaunch v{}\n\n{}\n\n{}\n",
        collect_arguments(),
        launcher_version,
        message,
        strip_ansi_codes(&details)
    );
    log_file
        .write_all(contents.as_bytes())
        .with_context(|| ErrorKind::ErrorLogError {
            file: log_file_path.clone(),
        })?;

    Ok(log_file_path)
}

fn compose_error_details(err: &LaunchError) -> Option<String> {
    // Only compose details if there is an underlying cause for the error
    let mut current = err.source()?;
    let mut details = String::new();

    // Walk up the tree of causes and include all of them
    loop {
        details.push_str(&format_error_cause(current));

        match current.source() {
            Some(cause) => {
                details.push_str("\n\n");
                current = cause;
            }
            None => {
                break;
            }
        };
    }

    Some(details)
}

/// Combines all the arguments into a single String
fn collect_arguments() -> String {
    // The Debug formatter for OsString properly quotes and escapes each value
    args_os()
        .map(|arg| format!("{:?}", arg))
        .collect::<Vec<String>>()
        .join(" ")
}
