//! Error types for the weights calculator

use thiserror::Error;

/// A reference table could not be fetched or does not parse.
///
/// Cloneable so one failed load can be handed to every caller that was
/// waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    #[error("Failed to fetch table '{table}': {reason}")]
    Transport { table: String, reason: String },

    #[error("Table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Table '{table}' line {line}: {reason}")]
    MalformedRow {
        table: String,
        line: u64,
        reason: String,
    },

    #[error("Load of table '{table}' ended without a result")]
    Interrupted { table: String },
}

impl DataSourceError {
    /// Id of the table this error belongs to
    pub fn table(&self) -> &str {
        match self {
            DataSourceError::Transport { table, .. }
            | DataSourceError::MissingColumn { table, .. }
            | DataSourceError::MalformedRow { table, .. }
            | DataSourceError::Interrupted { table } => table,
        }
    }
}

#[derive(Error, Debug)]
pub enum WeightsError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, WeightsError>;
