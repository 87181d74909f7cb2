pub const VENV_BIN_DIR: &str = "bin";
pub const INTERPRETER_NAME: &str = "python";
