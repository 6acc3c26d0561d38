//! Service layer owning the database handle.
//!
//! `ArborService` wraps `ArborDb` (raw database access) and the retry policy
//! used on write paths. All repo methods are implemented as `impl ArborService`.

use crate::ArborDb;
use crate::error::DatabaseError;
use crate::retry::RetryConfig;

/// Entry point for flow store and usage log operations.
pub struct ArborService {
    db: ArborDb,
    retry: RetryConfig,
}

impl ArborService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = ArborDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    /// Create from an existing `ArborDb`.
    #[must_use]
    pub fn from_db(db: ArborDb) -> Self {
        Self {
            db,
            retry: RetryConfig::default(),
        }
    }

    /// Replace the retry policy used on write paths.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &ArborDb {
        &self.db
    }

    #[must_use]
    pub const fn retry(&self) -> &RetryConfig {
        &self.retry
    }
}
