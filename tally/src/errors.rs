use thiserror::Error;

/// Calculator specific error types
#[derive(Error, Debug)]
pub enum CalcError {
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error("history persistence failed: {0}")]
    Persistence(#[from] rusqlite::Error),
}
