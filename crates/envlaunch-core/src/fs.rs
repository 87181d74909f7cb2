//! Provides utilities for operating on the filesystem.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Context, ErrorKind, Fallible};

/// Reads a file, if it exists.
pub fn read_file<P: AsRef<Path>>(path: P) -> io::Result<Option<String>> {
    let result: io::Result<String> = fs::read_to_string(path);

    match result {
        Ok(string) => Ok(Some(string)),
        Err(error) => match error.kind() {
            io::ErrorKind::NotFound => Ok(None),
            _ => Err(error),
        },
    }
}

/// Creates the parent directory of the input path, assuming the input path is a file.
pub fn ensure_containing_dir_exists<P: AsRef<Path>>(path: &P) -> Fallible<()> {
    path.as_ref()
        .parent()
        .ok_or_else(|| {
            ErrorKind::ContainingDirError {
                path: path.as_ref().to_owned(),
            }
            .into()
        })
        .and_then(|dir| {
            fs::create_dir_all(dir).with_context(|| ErrorKind::ContainingDirError {
                path: path.as_ref().to_owned(),
            })
        })
}

/// Whether the directory can be entered, i.e. used as a working directory.
///
/// Resolving `dir/.` needs search permission on `dir`, but not read permission.
pub fn is_enterable<P: AsRef<Path>>(dir: P) -> bool {
    fs::metadata(dir.as_ref().join("."))
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}
