use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad range, empty column name, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Config could not be rendered as TOML.
    #[error("cannot serialize config: {0}")]
    ConfigSerialize(String),
    /// The sheet could not be read as CSV.
    #[error("CSV error: {0}")]
    Csv(String),
    /// A column the builder or grouper needs is not in the header row.
    #[error("missing column '{column}' in sheet header")]
    MissingColumn { column: String },
    /// Species directory could not be listed.
    #[error("cannot scan species directory {}: {message}", path.display())]
    Scan { path: PathBuf, message: String },
    /// Species file could not be read.
    #[error("cannot read {}: {message}", path.display())]
    RecordRead { path: PathBuf, message: String },
    /// Species file is not valid JSON.
    #[error("cannot parse {}: {message}", path.display())]
    RecordParse { path: PathBuf, message: String },
    /// Species file is JSON but not shaped like a species record.
    #[error("malformed record {}: {message}", path.display())]
    MalformedRecord { path: PathBuf, message: String },
    /// Record could not be rendered back to JSON text.
    #[error("cannot serialize record: {0}")]
    Serialize(String),
    /// Species file could not be written back.
    #[error("cannot write {}: {message}", path.display())]
    RecordWrite { path: PathBuf, message: String },
}
