use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::Document;

/// Read access to the document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch `collection/id`.
    ///
    /// Returns `Ok(None)` when the document does not exist; `Err` only for
    /// transport or server failures.
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>>;
}
