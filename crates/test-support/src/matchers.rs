use std::fmt;
use std::process::Output;
use std::str;

use crate::process::ProcessBuilder;

use hamcrest2::core::{MatchResult, Matcher};

#[derive(Clone)]
pub struct Execs {
    expect_stdout: Option<String>,
    expect_exit_code: Option<i32>,
    expect_stderr_contains: Vec<String>,
    expect_stderr_not_contains: Vec<String>,
}

impl Execs {
    /// Verify that stdout is equal to the given lines.
    /// See `lines_match` for supported patterns.
    pub fn with_stdout<S: ToString>(mut self, expected: S) -> Execs {
        self.expect_stdout = Some(expected.to_string());
        self
    }

    /// Verify the exit code from the process.
    pub fn with_status(mut self, expected: i32) -> Execs {
        self.expect_exit_code = Some(expected);
        self
    }

    /// Verify that stderr contains the given contiguous lines somewhere in
    /// its output.
    /// See `lines_match` for supported patterns.
    pub fn with_stderr_contains<S: ToString>(mut self, expected: S) -> Execs {
        self.expect_stderr_contains.push(expected.to_string());
        self
    }

    /// Verify that stderr does not contain the given contiguous lines.
    /// See `lines_match` for supported patterns.
    ///
    /// A typo in the expected text makes this pass without verifying
    /// anything, so pair it with a positive check where possible.
    pub fn with_stderr_does_not_contain<S: ToString>(mut self, expected: S) -> Execs {
        self.expect_stderr_not_contains.push(expected.to_string());
        self
    }

    fn match_output(&self, actual: &Output) -> MatchResult {
        self.match_status(actual)?;
        self.match_std(
            self.expect_stdout.as_ref(),
            &actual.stdout,
            "stdout",
            &actual.stderr,
            MatchKind::Exact,
        )?;

        for expect in &self.expect_stderr_contains {
            self.match_std(
                Some(expect),
                &actual.stderr,
                "stderr",
                &actual.stdout,
                MatchKind::Partial,
            )?;
        }
        for expect in &self.expect_stderr_not_contains {
            self.match_std(
                Some(expect),
                &actual.stderr,
                "stderr",
                &actual.stdout,
                MatchKind::NotPresent,
            )?;
        }

        Ok(())
    }

    fn match_status(&self, actual: &Output) -> MatchResult {
        match self.expect_exit_code {
            None => Ok(()),
            Some(code) if actual.status.code() == Some(code) => Ok(()),
            Some(_) => Err(format!(
                "exited with {}\n--- stdout\n{}\n--- stderr\n{}",
                actual.status,
                String::from_utf8_lossy(&actual.stdout),
                String::from_utf8_lossy(&actual.stderr)
            )),
        }
    }

    fn match_std(
        &self,
        expected: Option<&String>,
        actual: &[u8],
        description: &str,
        extra: &[u8],
        kind: MatchKind,
    ) -> MatchResult {
        let out = match expected {
            Some(out) => out,
            None => return Ok(()),
        };
        let actual = match str::from_utf8(actual) {
            Err(..) => return Err(format!("{} was not utf8 encoded", description)),
            Ok(actual) => actual,
        };
        // Let's not deal with \r\n vs \n on windows...
        let actual = actual.replace('\r', "");

        match kind {
            MatchKind::Exact => {
                let diffs = diff_lines(actual.lines(), out.lines(), false);
                if diffs.is_empty() {
                    Ok(())
                } else {
                    Err(format!(
                        "differences:\n\
                         {}\n\n\
                         other output:\n\
                         `{}`",
                        diffs.join("\n"),
                        String::from_utf8_lossy(extra)
                    ))
                }
            }
            MatchKind::Partial => {
                if contains_lines(&actual, out) {
                    Ok(())
                } else {
                    Err(format!(
                        "expected to find:\n\
                         {}\n\n\
                         did not find in {}:\n\
                         {}",
                        out, description, actual
                    ))
                }
            }
            MatchKind::NotPresent => {
                if contains_lines(&actual, out) {
                    Err(format!(
                        "expected not to find:\n\
                         {}\n\n\
                         but found in {}:\n\
                         {}",
                        out, description, actual
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum MatchKind {
    Exact,
    Partial,
    NotPresent,
}

/// Whether the expected lines appear contiguously anywhere in the actual output
fn contains_lines(actual: &str, expected: &str) -> bool {
    let mut a = actual.lines();
    let e = expected.lines();

    loop {
        if diff_lines(a.clone(), e.clone(), true).is_empty() {
            return true;
        }
        if a.next().is_none() {
            return false;
        }
    }
}

fn diff_lines<'a>(actual: str::Lines<'a>, expected: str::Lines<'a>, partial: bool) -> Vec<String> {
    let actual = actual.take(if partial {
        expected.clone().count()
    } else {
        usize::MAX
    });
    let mut actual = actual.fuse();
    let mut expected = expected.fuse();
    let mut diffs = Vec::new();

    for i in 0.. {
        match (actual.next(), expected.next()) {
            (Some(a), Some(e)) => {
                if !lines_match(e, a) {
                    diffs.push(format!("{:3} - |{}|\n    + |{}|\n", i, e, a));
                }
            }
            (Some(a), None) => diffs.push(format!("{:3} -\n    + |{}|\n", i, a)),
            (None, Some(e)) => diffs.push(format!("{:3} - |{}|\n    +\n", i, e)),
            (None, None) => break,
        }
    }

    diffs
}

/// Compare a line with an expected pattern.
/// - Use `[..]` as a wildcard to match 0 or more characters on the same line
///   (similar to `.*` in a regex).
/// - Use `[EXE]` to optionally add `.exe` on Windows (empty string on other
///   platforms).
pub fn lines_match(expected: &str, actual: &str) -> bool {
    // Let's not deal with / vs \ (windows...)
    let expected = expected
        .replace('\\', "/")
        .replace("[EXE]", std::env::consts::EXE_SUFFIX);
    let mut actual: &str = &actual.replace('\\', "/");
    for (i, part) in expected.split("[..]").enumerate() {
        match actual.find(part) {
            Some(j) => {
                if i == 0 && j != 0 {
                    return false;
                }
                actual = &actual[j + part.len()..];
            }
            None => return false,
        }
    }
    actual.is_empty() || expected.ends_with("[..]")
}

#[test]
fn lines_match_works() {
    assert!(lines_match("a b", "a b"));
    assert!(lines_match("a[..]b", "a b"));
    assert!(lines_match("a[..]", "a b"));
    assert!(lines_match("[..]", "a b"));
    assert!(lines_match("[..]b", "a b"));

    assert!(!lines_match("[..]b", "c"));
    assert!(!lines_match("b", "c"));
    assert!(!lines_match("b", "cb"));
}

#[test]
fn contains_lines_works() {
    assert!(contains_lines("one\ntwo\nthree", "two\nthree"));
    assert!(contains_lines("one\ntwo\nthree", "[..]wo"));
    assert!(!contains_lines("one\ntwo\nthree", "three\none"));
    assert!(!contains_lines("", "one"));
}

impl fmt::Display for Execs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "execs")
    }
}

impl fmt::Debug for Execs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "execs")
    }
}

impl Matcher<ProcessBuilder> for Execs {
    fn matches(&self, mut process: ProcessBuilder) -> MatchResult {
        self.matches(&mut process)
    }
}

impl<'a> Matcher<&'a mut ProcessBuilder> for Execs {
    fn matches(&self, process: &'a mut ProcessBuilder) -> MatchResult {
        println!("running {}", process);
        let res = process.exec_with_output();

        match res {
            Ok(out) => self.match_output(&out),
            Err(err) => {
                if let Some(out) = &err.output {
                    return self.match_output(out);
                }
                Err(format!("could not exec process {}: {}", process, err))
            }
        }
    }
}

impl Matcher<Output> for Execs {
    fn matches(&self, output: Output) -> MatchResult {
        self.match_output(&output)
    }
}

pub fn execs() -> Execs {
    Execs {
        expect_stdout: None,
        expect_exit_code: Some(0),
        expect_stderr_contains: Vec::new(),
        expect_stderr_not_contains: Vec::new(),
    }
}
