use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Required field missing: {0}")]
    MissingField(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Field {field} should be a number, got '{value}'")]
    NotANumber { field: String, value: String },

    #[error("Field {field} should be at least {min}")]
    BelowMinimum { field: String, min: i64 },

    #[error("Field {field} cannot be more than {max}")]
    AboveMaximum { field: String, max: i64 },

    #[error("Unknown value '{value}' for {field}")]
    InvalidChoice { field: String, value: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Wrong value type for field {0}")]
    WrongType(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
