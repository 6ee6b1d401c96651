use crate::domain::DomainError;
use crate::ports::{ConfigError, RepositoryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid value: {0}")]
    Domain(#[from] DomainError),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<DomainError>),

    #[error("Application error: {0}")]
    Application(String),
}

fn join_errors(errors: &[DomainError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_field() {
        let err = AppError::Validation(vec![
            DomainError::MissingField("name".to_string()),
            DomainError::AboveMaximum { field: "hours".to_string(), max: 169 },
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: Required field missing: name; Field hours cannot be more than 169"
        );
    }
}
