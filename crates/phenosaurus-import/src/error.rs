use phenosaurus_common::ApiError;
use phenosaurus_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Missing column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A single row could not be imported
    #[error("{0}")]
    Row(String),
}

pub type Result<T> = std::result::Result<T, ImportError>;

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Db(e) => e.into(),
            ImportError::Sqlx(e) => ApiError::Internal(e.to_string()),
            ImportError::Io(e) => ApiError::Internal(e.to_string()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}
