use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("subscriber not found: {0}")]
    NotFound(String),
    #[error("subscriber already exists: {0}")]
    UniquenessViolation(String),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Map an insert failure, turning a unique-constraint hit into
    /// [`StoreError::UniquenessViolation`].
    pub(crate) fn from_insert(err: sqlx::Error, address: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::UniquenessViolation(address.to_string())
            }
            _ => StoreError::Storage(err),
        }
    }
}

/// True when a `CREATE TABLE` failed only because the table is already there:
/// SQLite result code 1 with a "table ... already exists" message.
pub(crate) fn is_table_exists(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            let msg = db.message();
            db.code().as_deref() == Some("1")
                && msg.starts_with("table ")
                && msg.ends_with("already exists")
        }
        _ => false,
    }
}
