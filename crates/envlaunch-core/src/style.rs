//! Utilities for styling command-line output.
use console::style;
use is_terminal::IsTerminal;
use std::error::Error;

const MAX_WIDTH: usize = 100;

/// Format the underlying cause of an error
pub(crate) fn format_error_cause(inner: &dyn Error) -> String {
    format!(
        "{}{} {}",
        style("cause").for_stderr().underlined().bold(),
        style(":").for_stderr().bold(),
        inner
    )
}

/// Get the width of the terminal the launcher reports to, limited to a maximum size
///
/// Returns `None` when stderr is not a terminal, so output is left unwrapped.
pub fn text_width() -> Option<usize> {
    if !std::io::stderr().is_terminal() {
        return None;
    }

    term_size::dimensions().map(|(width, _)| width.min(MAX_WIDTH))
}
