use super::Database;
use crate::error::EngineError;
use async_trait::async_trait;

/// Abstract interface for raw storage I/O of one named database.
///
/// This trait handles the "how" of storage (filesystem vs memory),
/// while `ProductStore` handles the "what" (keys, merges, schema).
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Load the database document.
    /// Returns Ok(None) if the database has never been created.
    async fn load(&self) -> Result<Option<Database>, EngineError>;

    /// Replace the stored document.
    /// MUST be atomic: a failed commit leaves the previous document intact.
    async fn commit(&self, db: &Database) -> Result<(), EngineError>;

    /// Human readable location, for messages.
    fn location(&self) -> String;
}
