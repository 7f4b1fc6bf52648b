//! Call repository.
//!
//! Start uses an atomic insert-if-absent (`$setOnInsert` + upsert) so
//! two racing starts on the same id produce exactly one document; the
//! loser observes no upserted id and reports the duplicate.

use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::{doc, to_document};
use mongodb::options::UpdateOptions;

use crate::database::Database;
use crate::database::models::{CallRecord, CallState};
use crate::database::store::{CallStore, StoreError};

pub struct CallRepository {
    collection: Collection<CallRecord>,
}

impl CallRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("calls"),
        }
    }
}

impl CallStore for CallRepository {
    async fn create(&self, call: &CallRecord) -> Result<bool, StoreError> {
        let filter = doc! { "call_id": &call.call_id };
        let update = doc! { "$setOnInsert": to_document(call)? };
        let options = UpdateOptions::builder().upsert(true).build();

        let result = self
            .collection
            .update_one(filter, update)
            .with_options(options)
            .await?;

        Ok(result.upserted_id.is_some())
    }

    async fn find(&self, call_id: &str) -> Result<Option<CallRecord>, StoreError> {
        let filter = doc! { "call_id": call_id };
        Ok(self.collection.find_one(filter).await?)
    }

    async fn finish(
        &self,
        call_id: &str,
        end_time: i64,
        duration: i64,
        reason: &str,
    ) -> Result<(), StoreError> {
        // Filter on the active state: a second close matches nothing
        // and the stored duration stays as the first close wrote it.
        let filter = doc! { "call_id": call_id, "status": CallState::Active.as_str() };
        let update = doc! {
            "$set": {
                "status": CallState::Ended.as_str(),
                "end_time": end_time,
                "duration": duration,
                "end_reason": reason,
            },
        };

        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<CallRecord>, StoreError> {
        let filter = doc! { "status": CallState::Active.as_str() };
        let cursor = self.collection.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }
}
