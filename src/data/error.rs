use thiserror::Error;

/// A problem with the shape or content of an input dataset.
///
/// Loader functions wrap these in `anyhow` context carrying the file and
/// row number, so the variants themselves stay row-agnostic.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("cannot parse timestamp '{0}'")]
    BadTimestamp(String),

    #[error("unknown season code {0} (expected 1-4)")]
    UnknownSeason(u8),

    #[error("unknown weather code {0} (expected 1-4)")]
    UnknownWeather(u8),

    #[error("column '{column}' has invalid value {value}")]
    InvalidValue { column: &'static str, value: String },
}
