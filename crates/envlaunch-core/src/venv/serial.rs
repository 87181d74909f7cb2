use std::path::PathBuf;

/// The raw contents of a `pyvenv.cfg` file.
///
/// The format is a flat list of `key = value` lines. Keys are matched
/// case-insensitively and unknown keys are ignored.
#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct RawVenvConfig {
    home: Option<String>,
    version: Option<String>,
    prompt: Option<String>,
}

/// A validated `pyvenv.cfg`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenvConfig {
    /// Directory of the base interpreter the environment was created from
    pub home: PathBuf,
    /// Version of the base interpreter, if recorded
    pub version: Option<String>,
    /// Custom prompt chosen with `python -m venv --prompt`
    pub prompt: Option<String>,
}

impl RawVenvConfig {
    pub(super) fn parse(contents: &str) -> Result<Self, String> {
        let mut raw = RawVenvConfig::default();

        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| format!("line {} is not a `key = value` pair", index + 1))?;
            let key = key.trim().to_lowercase();
            let value = value.trim();

            if key.is_empty() {
                return Err(format!("line {} has an empty key", index + 1));
            }

            match key.as_str() {
                "home" => raw.home = Some(value.to_string()),
                // `uv` writes `version_info` instead of `version`
                "version" | "version_info" => raw.version = Some(value.to_string()),
                "prompt" => raw.prompt = Some(unquote(value).to_string()),
                _ => {}
            }
        }

        Ok(raw)
    }

    pub(super) fn into_config(self) -> Result<VenvConfig, String> {
        let home = match self.home {
            Some(home) if !home.is_empty() => PathBuf::from(home),
            _ => return Err("missing required key `home`".into()),
        };

        Ok(VenvConfig {
            home,
            version: self.version.filter(|v| !v.is_empty()),
            prompt: self.prompt.filter(|p| !p.is_empty()),
        })
    }
}

// Python 3.9+ writes the prompt quoted with `repr()`
fn unquote(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
