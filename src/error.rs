use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Date arithmetic overflowed from {date} by {days} days")]
    DateOutOfRange { date: String, days: i64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ledger error: {reason}")]
    Ledger { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

pub type Result<T> = std::result::Result<T, BookingError>;
