use bson::Document;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use crate::store::StoreResult;

pub struct BaseDao<T: Send + Sync> {
    collection: Collection<T>,
}

impl<T> BaseDao<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync,
{
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<T>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    pub async fn find_one(&self, filter: Document) -> StoreResult<Option<T>> {
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn find_many(
        &self,
        filter: Document,
        sort: Option<Document>,
    ) -> StoreResult<Vec<T>> {
        let mut cursor = if let Some(sort) = sort {
            self.collection.find(filter).sort(sort).await?
        } else {
            self.collection.find(filter).await?
        };

        let mut results = Vec::new();
        use futures::TryStreamExt;
        while let Some(doc) = cursor.try_next().await? {
            results.push(doc);
        }
        Ok(results)
    }

    /// Replace-or-insert keyed by `filter`.
    pub async fn upsert_one(&self, filter: Document, doc: &T) -> StoreResult<()> {
        self.collection
            .replace_one(filter, doc)
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn update_one(&self, filter: Document, update: Document) -> StoreResult<bool> {
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.modified_count > 0)
    }

    pub async fn delete_one(&self, filter: Document) -> StoreResult<bool> {
        let result = self.collection.delete_one(filter).await?;
        Ok(result.deleted_count > 0)
    }

    pub async fn delete_many(&self, filter: Document) -> StoreResult<u64> {
        let result = self.collection.delete_many(filter).await?;
        Ok(result.deleted_count)
    }

    pub async fn count(&self, filter: Document) -> StoreResult<u64> {
        Ok(self.collection.count_documents(filter).await?)
    }
}
