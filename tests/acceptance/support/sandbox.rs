use std::env;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use test_support::{self, ok_or_panic, paths, paths::PathExt, process::ProcessBuilder};

/// Stand-in for the virtual environment's interpreter.
///
/// Records the entry point, each forwarded argument (one `[arg]` per line), the activation
/// variables it observed and its working directory, then writes one line to each stream.
/// `FAKE_PYTHON_SIGNAL` makes it kill itself, `FAKE_PYTHON_EXIT` picks its exit status.
const FAKE_PYTHON: &str = r#"#!/bin/sh
printf '%s\n' "$1" > entry.txt
shift
: > args.txt
for arg in "$@"; do
    printf '[%s]\n' "$arg" >> args.txt
done
printf '%s\n' "$VIRTUAL_ENV" > virtual_env.txt
printf '%s\n' "$PATH" > path.txt
printf '%s\n' "${PYTHONHOME-<unset>}" > pythonhome.txt
pwd -P > cwd.txt
echo "pipeline stdout"
echo "pipeline stderr" >&2
if [ -n "$FAKE_PYTHON_SIGNAL" ]; then
    kill -s "$FAKE_PYTHON_SIGNAL" $$
fi
exit "${FAKE_PYTHON_EXIT:-0}"
"#;

const PYVENV_CFG: &str = "home = /usr/bin
include-system-site-packages = false
version = 3.11.4
";

const MAIN_PY: &str = "print('pipeline')\n";

// used to construct the files of the sandboxed launch directory
#[derive(PartialEq, Clone)]
pub struct FileBuilder {
    path: PathBuf,
    contents: String,
    executable: bool,
}

impl FileBuilder {
    pub fn new(path: PathBuf, contents: &str) -> FileBuilder {
        FileBuilder {
            path,
            contents: contents.to_string(),
            executable: false,
        }
    }

    pub fn executable(mut self) -> FileBuilder {
        self.executable = true;
        self
    }

    pub fn build(&self) {
        self.dirname().mkdir_p();

        let mut file = File::create(&self.path)
            .unwrap_or_else(|e| panic!("could not create file {}: {}", self.path.display(), e));

        ok_or_panic! { file.write_all(self.contents.as_bytes()) };

        if self.executable {
            make_executable(&self.path);
        }
    }

    fn dirname(&self) -> &Path {
        self.path.parent().unwrap()
    }
}

#[derive(PartialEq, Clone)]
pub struct EnvVar {
    name: String,
    value: String,
}

impl EnvVar {
    pub fn new(name: &str, value: &str) -> Self {
        EnvVar {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

pub struct SandboxBuilder {
    root: Sandbox,
    files: Vec<FileBuilder>,
}

impl SandboxBuilder {
    /// Root of the launch directory being built
    pub fn root(&self) -> PathBuf {
        self.root.root()
    }

    pub fn new(root: PathBuf, launch_dir: &str) -> SandboxBuilder {
        SandboxBuilder {
            root: Sandbox {
                root,
                launch_dir: launch_dir.to_string(),
                env_vars: vec![],
            },
            files: vec![],
        }
    }

    /// Provision a complete virtual environment: `pyvenv.cfg` plus an executable interpreter (chainable)
    pub fn venv(self) -> Self {
        self.venv_config(PYVENV_CFG).interpreter(FAKE_PYTHON)
    }

    /// Write `venv/pyvenv.cfg` with the given contents (chainable)
    pub fn venv_config(mut self, contents: &str) -> Self {
        let path = venv_dir(self.root()).join("pyvenv.cfg");
        self.files.push(FileBuilder::new(path, contents));
        self
    }

    /// Write the virtual environment's interpreter with the given script (chainable)
    pub fn interpreter(mut self, script: &str) -> Self {
        let path = interpreter_file(self.root());
        self.files
            .push(FileBuilder::new(path, script).executable());
        self
    }

    /// Write the interpreter without any execute permission (chainable)
    pub fn unexecutable_interpreter(mut self) -> Self {
        let path = interpreter_file(self.root());
        self.files.push(FileBuilder::new(path, FAKE_PYTHON));
        self
    }

    /// Write `scripts/main.py` (chainable)
    pub fn entry_point(mut self) -> Self {
        let path = self.root().join("scripts").join("main.py");
        self.files.push(FileBuilder::new(path, MAIN_PY));
        self
    }

    /// Write an arbitrary file, relative to the launch directory (chainable)
    pub fn file(mut self, path: &str, contents: &str) -> Self {
        let path = self.root().join(path);
        self.files.push(FileBuilder::new(path, contents));
        self
    }

    /// Set an environment variable for the sandbox (chainable)
    pub fn env(mut self, name: &str, value: &str) -> Self {
        self.root.env_vars.push(EnvVar::new(name, value));
        self
    }

    /// Create the launch directory
    pub fn build(self) -> Sandbox {
        // First, clean the directory if it already exists
        self.rm_root();

        // Create the empty directory, plus one outside of it to run from
        self.root.root().mkdir_p();
        self.root.elsewhere().mkdir_p();

        install_launcher(&self.root.launcher_exe());

        for file_builder in self.files {
            file_builder.build();
        }

        self.root
    }

    fn rm_root(&self) {
        self.root.root.rm_rf()
    }
}

pub struct Sandbox {
    root: PathBuf,
    launch_dir: String,
    env_vars: Vec<EnvVar>,
}

impl Sandbox {
    /// Root of the launch directory, ex: `/path/to/cargo/target/acceptance_test/t0/sandbox/pipeline`
    pub fn root(&self) -> PathBuf {
        self.root.join(&self.launch_dir)
    }

    /// A directory outside of the launch directory, used as the caller's working directory
    pub fn elsewhere(&self) -> PathBuf {
        self.root.join("elsewhere")
    }

    /// The launcher installed into the launch directory
    pub fn launcher_exe(&self) -> PathBuf {
        self.root()
            .join(format!("envlaunch{}", env::consts::EXE_SUFFIX))
    }

    /// Create a `ProcessBuilder` to run a program from outside the launch directory.
    pub fn process<T: AsRef<OsStr>>(&self, program: T) -> ProcessBuilder {
        let mut p = test_support::process::process(program);
        p.cwd(self.elsewhere())
            // sandbox the activation environment
            .env_remove("ENVLAUNCH_LOGLEVEL")
            .env_remove("VIRTUAL_ENV")
            .env_remove("VIRTUAL_ENV_PROMPT")
            .env_remove("PYTHONHOME")
            .env_remove("FAKE_PYTHON_EXIT")
            .env_remove("FAKE_PYTHON_SIGNAL");

        // overrides for env vars
        for env_var in &self.env_vars {
            p.env(&env_var.name, &env_var.value);
        }

        p
    }

    /// Create a `ProcessBuilder` that runs the installed launcher with the given arguments,
    /// passed as-is.
    /// Example:
    ///     assert_that!(s.launcher(&["--date", "2024-01-01"]), execs());
    pub fn launcher<T: AsRef<OsStr>>(&self, args: &[T]) -> ProcessBuilder {
        let mut p = self.process(self.launcher_exe());
        p.args(args);
        p
    }

    /// Whether the target program was started at all
    pub fn target_ran(&self) -> bool {
        self.root().join("args.txt").exists()
    }

    /// The arguments the target program received after its entry point
    pub fn read_args(&self) -> Vec<String> {
        read_file_to_string(self.root().join("args.txt"))
            .lines()
            .map(|line| {
                line.strip_prefix('[')
                    .and_then(|l| l.strip_suffix(']'))
                    .unwrap_or_else(|| panic!("malformed argument record: {}", line))
                    .to_string()
            })
            .collect()
    }

    pub fn read_entry(&self) -> String {
        read_recorded_line(self.root().join("entry.txt"))
    }

    pub fn read_virtual_env(&self) -> String {
        read_recorded_line(self.root().join("virtual_env.txt"))
    }

    pub fn read_path(&self) -> String {
        read_recorded_line(self.root().join("path.txt"))
    }

    pub fn read_pythonhome(&self) -> String {
        read_recorded_line(self.root().join("pythonhome.txt"))
    }

    pub fn read_cwd(&self) -> String {
        read_recorded_line(self.root().join("cwd.txt"))
    }

    /// Clear the records left by a previous run of the target program
    pub fn clear_records(&self) {
        for record in &[
            "entry.txt",
            "args.txt",
            "virtual_env.txt",
            "path.txt",
            "pythonhome.txt",
            "cwd.txt",
        ] {
            self.root().join(record).rm();
        }
    }

    pub fn read_log_dir(&self) -> Option<fs::ReadDir> {
        fs::read_dir(self.root().join("logs")).ok()
    }
}

// Generates a sandboxed launch directory
pub fn sandbox() -> SandboxBuilder {
    sandbox_named("pipeline")
}

// Generates a sandboxed launch directory with the given directory name
pub fn sandbox_named(launch_dir: &str) -> SandboxBuilder {
    SandboxBuilder::new(paths::root().join("sandbox"), launch_dir)
}

// Path to compiled executables
pub fn cargo_dir() -> PathBuf {
    env::var_os("CARGO_BIN_PATH")
        .map(PathBuf::from)
        .or_else(|| {
            env::current_exe().ok().map(|mut path| {
                path.pop();
                if path.ends_with("deps") {
                    path.pop();
                }
                path
            })
        })
        .unwrap_or_else(|| panic!("CARGO_BIN_PATH wasn't set. Cannot continue running test"))
}

fn launcher_exe() -> PathBuf {
    cargo_dir().join(format!("envlaunch{}", env::consts::EXE_SUFFIX))
}

fn venv_dir(root: PathBuf) -> PathBuf {
    root.join("venv")
}

fn interpreter_file(root: PathBuf) -> PathBuf {
    let bin = if cfg!(windows) { "Scripts" } else { "bin" };
    venv_dir(root)
        .join(bin)
        .join(format!("python{}", env::consts::EXE_SUFFIX))
}

// Prefer a hard link: running a freshly written copy can fail with ETXTBSY
fn install_launcher(installed: &Path) {
    if fs::hard_link(launcher_exe(), installed).is_err() {
        ok_or_panic! { fs::copy(launcher_exe(), installed) };
        make_executable(installed);
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    ok_or_panic! { fs::set_permissions(path, fs::Permissions::from_mode(0o755)) };
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}

fn read_recorded_line(file_path: PathBuf) -> String {
    read_file_to_string(file_path).trim_end_matches('\n').to_string()
}

fn read_file_to_string(file_path: PathBuf) -> String {
    ok_or_panic! { fs::read_to_string(file_path) }
}
