use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Observation source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Station lookup failed for {station_id}: {reason}")]
    LookupFailure { station_id: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration load error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Output persistence error: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl ReportError {
    pub fn lookup(station_id: &str, reason: impl Into<String>) -> Self {
        ReportError::LookupFailure {
            station_id: station_id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ReportError::Configuration(message.into())
    }
}
