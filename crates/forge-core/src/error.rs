//! Error types for Forge

use thiserror::Error;

/// The main error type for Forge operations
#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Schema mismatch: {0}")]
    SchemaError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Insufficient credits: {credits} remaining")]
    InsufficientCredits { credits: u32 },

    #[error("Deadline exceeded during {0}")]
    DeadlineExceeded(String),

    #[error("Asset assembly failed: {0}")]
    AssemblyError(String),

    #[error("No asset has been generated yet")]
    NoActiveAsset,

    #[error("Invalid value: {field} = {value}")]
    InvalidValue { field: String, value: String },

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Result type alias for Forge operations
pub type Result<T> = std::result::Result<T, ForgeError>;

impl From<toml::de::Error> for ForgeError {
    fn from(err: toml::de::Error) -> Self {
        ForgeError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for ForgeError {
    fn from(err: toml::ser::Error) -> Self {
        ForgeError::TomlSerError(err.to_string())
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(err: serde_json::Error) -> Self {
        ForgeError::JsonError(err.to_string())
    }
}
