use thiserror::Error;

/// Failures of the only fallible surface of the core: loading and
/// validating injected configuration. Gameplay itself never errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid { field, reason: reason.into() }
    }

    /// Whether retrying with a corrected file could succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ConfigError::Io(_) => true,
            ConfigError::UnsupportedFormat { .. } => true,
            ConfigError::Json(_) | ConfigError::Yaml(_) => true,
            ConfigError::Invalid { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
