use async_trait::async_trait;
use serde_json::Value;

use super::{CollectionError, FindQuery, Populate};
use crate::filtering::FilterExpression;

/// A queryable set of documents.
///
/// Implemented by [`crate::database::MemoryCollection`] and
/// [`crate::database::SeaCollection`]; implement it for any other store to
/// put it behind the list endpoints.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Name used in headers, logs and error messages
    fn name(&self) -> &str;

    /// Run a find request and return the matching records in order.
    async fn find(&self, query: &FindQuery) -> Result<Vec<Value>, CollectionError>;

    /// Count documents, optionally only those matching `filter`.
    async fn count(&self, filter: Option<&FilterExpression>) -> Result<u64, CollectionError>;

    /// Fetch one document by its `_id`.
    async fn find_by_id(&self, id: &str) -> Result<Value, CollectionError> {
        self.find_by_id_with(id, None).await
    }

    /// Fetch one document by its `_id`, expanding `populate` when given.
    async fn find_by_id_with(
        &self,
        id: &str,
        populate: Option<&Populate>,
    ) -> Result<Value, CollectionError> {
        let mut query = FindQuery::new(FilterExpression::equals("_id", id)).limit(1);
        if let Some(populate) = populate {
            query = query.populate(populate.clone());
        }
        self.find(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CollectionError::NotFound {
                collection: self.name().to_string(),
                id: Some(id.to_string()),
            })
    }
}
