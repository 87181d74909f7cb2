// `python -m venv` on Windows puts its executables under `Scripts` rather than `bin`
pub const VENV_BIN_DIR: &str = "Scripts";
pub const INTERPRETER_NAME: &str = "python";
