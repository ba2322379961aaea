use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::foundation::core::SlideDuration;
use crate::foundation::error::{SlideError, SlideResult};

/// File name of the per-job variables mapping inside the input folder.
pub const VARIABLES_FILE_NAME: &str = "variables.dictionary";
/// Environment variable naming the input folder that holds [`VARIABLES_FILE_NAME`].
pub const INPUT_FOLDER_ENV: &str = "CROSSCOMPUTE_INPUT_FOLDER";
/// Input folder used when [`INPUT_FOLDER_ENV`] is unset.
pub const DEFAULT_INPUT_FOLDER: &str = "batches/standard/input";
/// Key holding the per-slide duration in seconds.
pub const DURATION_KEY: &str = "duration";

/// Key-value job configuration, read once per job.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobVariables {
    values: Map<String, Value>,
}

impl JobVariables {
    /// Read the variables file at `path`.
    ///
    /// A missing, unreadable, empty, or non-object file is a [`SlideError::Configuration`].
    pub fn from_path(path: &Path) -> SlideResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SlideError::configuration(format!(
                "read variables file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&text).map_err(|e| match e {
            SlideError::Configuration(msg) => {
                SlideError::configuration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Parse a variables mapping from JSON text.
    pub fn from_json_str(text: &str) -> SlideResult<Self> {
        if text.trim().is_empty() {
            return Err(SlideError::configuration("variables file is empty"));
        }
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SlideError::configuration(format!("parse variables JSON: {e}")))?;
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(SlideError::configuration(format!(
                "variables must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Build variables from an in-memory map.
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Raw value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Slide duration with the fallback policy of [`resolve_duration`] applied.
    pub fn duration(&self) -> SlideDuration {
        resolve_duration(self.get(DURATION_KEY))
    }
}

/// Resolve a configured duration, falling back to [`SlideDuration::DEFAULT`].
///
/// Accepted: a string of ASCII digits or a JSON integer, either with a positive value that
/// fits in `u32`. Anything else, including an absent value, resolves to the default.
pub fn resolve_duration(value: Option<&Value>) -> SlideDuration {
    let resolved = match value {
        None => return SlideDuration::DEFAULT,
        Some(Value::String(s)) => parse_duration_str(s),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|secs| u32::try_from(secs).ok())
            .and_then(SlideDuration::new),
        Some(_) => None,
    };

    resolved.unwrap_or_else(|| {
        let raw = value.map(|v| v.to_string()).unwrap_or_default();
        tracing::warn!(
            value = %raw,
            fallback = SlideDuration::DEFAULT.secs(),
            "unusable slide duration, using default"
        );
        SlideDuration::DEFAULT
    })
}

/// Parse a duration string made only of ASCII digits.
pub fn parse_duration_str(s: &str) -> Option<SlideDuration> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok().and_then(SlideDuration::new)
}

/// Default variables file location: `$CROSSCOMPUTE_INPUT_FOLDER/variables.dictionary`, or
/// the same file under [`DEFAULT_INPUT_FOLDER`] when the variable is unset.
pub fn default_variables_path() -> PathBuf {
    variables_path_in(std::env::var_os(INPUT_FOLDER_ENV))
}

fn variables_path_in(folder: Option<OsString>) -> PathBuf {
    let folder = folder
        .filter(|f| !f.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_FOLDER));
    folder.join(VARIABLES_FILE_NAME)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/variables.rs"]
mod tests;
