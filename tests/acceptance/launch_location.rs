use std::fs;
use std::os::unix::fs::symlink;

use crate::support::sandbox::{sandbox, sandbox_named};
use hamcrest2::assert_that;
use hamcrest2::prelude::*;
use test_support::matchers::execs;
use test_support::process::process;

fn canonical_root(root: std::path::PathBuf) -> String {
    fs::canonicalize(root).unwrap().display().to_string()
}

#[test]
fn runs_in_the_launch_directory_from_anywhere() {
    let s = sandbox().venv().entry_point().build();

    assert_that!(s.launcher::<&str>(&[]), execs().with_status(0));

    assert_that!(s.read_cwd(), eq(canonical_root(s.root())));
}

#[test]
fn relative_invocation() {
    let s = sandbox().venv().entry_point().build();

    let mut p = s.process("./envlaunch");
    p.cwd(s.root()).arg("--relative");

    assert_that!(p, execs().with_status(0));

    assert_that!(s.read_args(), eq(vec!["--relative".to_string()]));
    assert_that!(s.read_cwd(), eq(canonical_root(s.root())));
}

#[test]
fn relative_invocation_from_a_sibling_directory() {
    let s = sandbox().venv().entry_point().build();

    let mut p = s.process("../pipeline/envlaunch");
    p.arg("--sibling");

    assert_that!(p, execs().with_status(0));

    assert_that!(s.read_args(), eq(vec!["--sibling".to_string()]));
}

#[test]
fn symlinked_launcher_resolves_to_its_target() {
    let s = sandbox().venv().entry_point().build();
    let link = s.elsewhere().join("run-pipeline");
    symlink(s.launcher_exe(), &link).unwrap();

    assert_that!(s.process(&link), execs().with_status(0));

    assert_that!(s.read_cwd(), eq(canonical_root(s.root())));
}

#[test]
fn caller_directory_is_left_untouched() {
    let s = sandbox().venv().entry_point().build();

    assert_that!(s.launcher::<&str>(&[]), execs().with_status(0));

    let leftovers = fs::read_dir(s.elsewhere()).unwrap().count();
    assert_that!(leftovers, eq(0));
}

#[test]
fn repeated_runs_behave_the_same() {
    let s = sandbox().venv().entry_point().build();

    assert_that!(s.launcher(&["first"]), execs().with_status(0));
    let first_path = s.read_path();
    let first_venv = s.read_virtual_env();
    s.clear_records();

    assert_that!(s.launcher(&["first"]), execs().with_status(0));
    assert_that!(s.read_args(), eq(vec!["first".to_string()]));
    assert_that!(s.read_path(), eq(first_path));
    assert_that!(s.read_virtual_env(), eq(first_venv));
}

#[test]
fn absolute_path_through_plain_process() {
    let s = sandbox().venv().entry_point().build();

    let mut p = process(s.launcher_exe());
    p.cwd("/").env_remove("VIRTUAL_ENV").arg("--from-root");

    assert_that!(p, execs().with_status(0));

    assert_that!(s.read_args(), eq(vec!["--from-root".to_string()]));
}

#[test]
fn unlistable_launch_dir_can_still_be_entered() {
    use std::os::unix::fs::PermissionsExt;

    let s = sandbox().venv().entry_point().build();
    fs::set_permissions(s.root(), fs::Permissions::from_mode(0o311)).unwrap();

    let output = s.launcher(&["--date", "2024-01-01"]).build_command().output();

    fs::set_permissions(s.root(), fs::Permissions::from_mode(0o755)).unwrap();
    assert_that!(
        output.unwrap(),
        execs()
            .with_status(0)
            .with_stderr_does_not_contain("envlaunch error:[..]")
    );
    assert_that!(
        s.read_args(),
        eq(vec!["--date".to_string(), "2024-01-01".to_string()])
    );
}

#[test]
fn path_separator_in_launch_dir() {
    let s = sandbox_named("pipe:line")
        .venv()
        .entry_point()
        .env("ENVLAUNCH_LOGLEVEL", "warn")
        .build();

    assert_that!(
        s.launcher(&["--weekly"]),
        execs()
            .with_status(0)
            .with_stderr_contains("envlaunch warning: Could not add [..]pipe:line[..] to PATH[..]")
    );

    assert_that!(s.read_args(), eq(vec!["--weekly".to_string()]));
    assert_that!(s.read_virtual_env().ends_with("pipe:line/venv"), eq(true));
}
