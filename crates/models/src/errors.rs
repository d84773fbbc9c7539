use thiserror::Error;

/// Errors raised by the entity layer.
///
/// `Validation` is the data-validation failure produced while deserializing
/// untrusted input; its message names the offending field.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    pub fn missing(field: &str) -> Self {
        Self::Validation(format!("Missing {field}"))
    }

    pub fn invalid_type(field: &str, detail: impl std::fmt::Display) -> Self {
        Self::Validation(format!("Invalid type for {field}: {detail}"))
    }

    pub fn invalid_value(field: &str, detail: impl std::fmt::Display) -> Self {
        Self::Validation(format!("Invalid value for {field}: {detail}"))
    }
}

impl From<sea_orm::DbErr> for ModelError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Db(e.to_string())
    }
}
