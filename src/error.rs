use thiserror::Error;

/// A raw record that cannot be turned into the normalized model.
#[derive(Debug, Error)]
pub enum DataFormatError {
    #[error("malformed record at {record}: {source}")]
    Malformed {
        record: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{record}: missing required field `{field}`")]
    MissingField { record: String, field: &'static str },
    #[error("{record}: invalid date `{value}` (expected YYYY-MM-DD)")]
    InvalidDate {
        record: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("{record}: field `{field}` has an invalid value {value}")]
    InvalidValue {
        record: String,
        field: &'static str,
        value: String,
    },
    #[error("{record}: section `{section}` must be a list")]
    NotAList { record: String, section: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("program configuration is missing `{0}`")]
    MissingKey(&'static str),
    #[error("program configuration key `{key}` has an invalid value `{value}`")]
    InvalidValue { key: &'static str, value: String },
}

/// Rejected data-entry request (new exam, study week).
#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    #[error("semester must be at least 1, got {0}")]
    InvalidSemester(u32),
    #[error("ECTS must be positive")]
    ZeroEcts,
    #[error("attempt must be at least 1, got {0}")]
    InvalidAttempt(u32),
    #[error("grade must be between 1.0 and 5.0, got {0}")]
    GradeOutOfRange(f64),
    #[error("study hours must not be negative, got {0}")]
    NegativeHours(f64),
    #[error("study hours must be a finite number, got {0}")]
    InvalidHours(f64),
    #[error("no study time recorded for week {0}, nothing to delete")]
    NothingToDelete(chrono::NaiveDate),
    #[error("document root must be a JSON object")]
    NotAnObject,
    #[error("section `{0}` must be a list")]
    NotAList(&'static str),
}
