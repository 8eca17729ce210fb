use std::path::PathBuf;
use thiserror::Error;

/// Failures at the file boundary. Any of these ends the run before a report is written.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid JSON for this input: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot open spreadsheet {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },
    #[error("spreadsheet {path} is missing header column {column}")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("unsupported roster format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("roster {0} contains no rooms")]
    EmptyRoster(PathBuf),
}
