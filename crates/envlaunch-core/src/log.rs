//! This module provides a custom Logger implementation for use with the `log` crate
//!
//! Everything the launcher prints goes to stderr: stdout belongs to the target program.
use console::style;
use is_terminal::IsTerminal;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::env;
use std::fmt::Display;
use textwrap::{fill, Options, WordSplitter};

use crate::style::text_width;

const ERROR_PREFIX: &str = "envlaunch error:";
const WARNING_PREFIX: &str = "envlaunch warning:";
const ENVLAUNCH_LOGLEVEL: &str = "ENVLAUNCH_LOGLEVEL";
const ALLOWED_PREFIX: &str = "envlaunch";
const WRAP_INDENT: &str = "    ";

pub struct Logger {
    level: LevelFilter,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) && record.target().starts_with(ALLOWED_PREFIX) {
            match record.level() {
                Level::Error => self.log_error(record.args()),
                Level::Warn => self.log_warning(record.args()),
                Level::Info => eprintln!("{}", record.args()),
                _ => eprintln!("[verbose] {}", record.args()),
            }
        }
    }

    fn flush(&self) {}
}

impl Logger {
    /// Initialize the global logger, using the environment to determine the level of verbosity
    pub fn init() -> Result<(), SetLoggerError> {
        let logger = Logger {
            level: level_from_env(),
        };
        log::set_max_level(logger.level);
        log::set_boxed_logger(Box::new(logger))?;
        Ok(())
    }

    fn log_error<D>(&self, message: &D)
    where
        D: Display,
    {
        eprintln!(
            "{} {}",
            style(ERROR_PREFIX).for_stderr().red().bold(),
            message
        );
    }

    fn log_warning<D>(&self, message: &D)
    where
        D: Display,
    {
        eprintln!(
            "{}{}",
            style(WARNING_PREFIX).for_stderr().yellow().bold(),
            wrap_content(WARNING_PREFIX, message)
        );
    }
}

/// Wraps the supplied content to the terminal width, if we are in a terminal.
/// If not, returns the content as a String
///
/// Note: Uses the supplied prefix to calculate the terminal width, but then removes
/// it so that it can be styled (style characters are counted against the wrapped width)
fn wrap_content<D>(prefix: &str, content: &D) -> String
where
    D: Display,
{
    match text_width() {
        Some(width) => {
            let options = Options::new(width)
                .word_splitter(WordSplitter::NoHyphenation)
                .subsequent_indent(WRAP_INDENT)
                .break_words(false);

            fill(&format!("{} {}", prefix, content), options).replacen(prefix, "", 1)
        }
        None => format!(" {}", content),
    }
}

/// Determines the correct logging level based on the environment
fn level_from_env() -> LevelFilter {
    parse_level(
        env::var(ENVLAUNCH_LOGLEVEL).ok(),
        std::io::stderr().is_terminal(),
    )
}

/// If ENVLAUNCH_LOGLEVEL is set to a valid level, we use that
/// If not, we check whether stderr is a TTY or not
///     If it is a TTY, we use Warn
///     If it is NOT a TTY, we use Error, as the launcher usually runs unattended from a scheduler
fn parse_level(requested: Option<String>, is_terminal: bool) -> LevelFilter {
    requested
        .and_then(|level| level.trim().to_uppercase().parse().ok())
        .unwrap_or(if is_terminal {
            LevelFilter::Warn
        } else {
            LevelFilter::Error
        })
}
