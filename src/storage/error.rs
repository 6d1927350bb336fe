use derive_more::{Display, From};

/// Failures surfaced by a storage backend.
///
/// A missing record is never an error here, reads and updates return `None` for it.
#[derive(Debug, Display, From)]
pub enum StorageError {
    /// Fatal at startup, the process should not continue.
    #[display(fmt = "storage configuration error: {}", _0)]
    #[from(ignore)]
    Config(String),

    /// Passed through from the driver untouched, no retry happens at this layer.
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),

    /// Usernames are unique across users.
    #[display(fmt = "username {:?} is already taken", _0)]
    #[from(ignore)]
    UsernameTaken(String),

    #[display(fmt = "schema migration {} failed: {}", version, source)]
    #[from(ignore)]
    Migration { version: u32, source: sqlx::Error },
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Config(_) | StorageError::UsernameTaken(_) => None,
            StorageError::Database(e) => Some(e),
            StorageError::Migration { source, .. } => Some(source),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
