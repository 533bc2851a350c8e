//! Core shared errors (renderer-agnostic).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("missing config value '{0}'")]
    Missing(String),
    #[error("config value '{key}' is malformed: '{value}'")]
    Malformed { key: String, value: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
