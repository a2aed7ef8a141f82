use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Reads a required, non-blank variable.
pub(crate) fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

/// Reads an optional variable, treating blank values as unset.
pub(crate) fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads and parses a variable, falling back to `default` when unset or unparseable.
pub(crate) fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    optional(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}
