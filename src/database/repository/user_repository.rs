//! User repository.
//!
//! All moderation writes are whole sub-document `$set`/`$unset`
//! overwrites keyed on `user_id`, so concurrent moderation calls
//! resolve last-writer-wins with the record always self-consistent.

use mongodb::Collection;
use mongodb::bson::{doc, to_bson};
use mongodb::options::UpdateOptions;
use tracing::debug;

use crate::database::Database;
use crate::database::models::{BanStatus, QuarantineStatus, UserRecord};
use crate::database::store::{StoreError, UserStore};

pub struct UserRepository {
    collection: Collection<UserRecord>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }

    fn upsert_options() -> UpdateOptions {
        UpdateOptions::builder().upsert(true).build()
    }
}

impl UserStore for UserRepository {
    async fn find(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let filter = doc! { "user_id": user_id };
        Ok(self.collection.find_one(filter).await?)
    }

    async fn upsert_presence(
        &self,
        user_id: &str,
        ip: &str,
        country: &str,
        now: i64,
    ) -> Result<(), StoreError> {
        let filter = doc! { "user_id": user_id };
        let update = doc! {
            "$set": {
                "ip": ip,
                "country": country,
                "connected": true,
                "last_seen": now,
            },
            "$setOnInsert": {
                "user_id": user_id,
                "report_count": 0_i64,
                "violations": 0_i64,
            },
        };

        self.collection
            .update_one(filter, update)
            .with_options(Self::upsert_options())
            .await?;

        debug!("Upserted presence for user {}", user_id);
        Ok(())
    }

    async fn set_connection(
        &self,
        user_id: &str,
        connected: bool,
        now: i64,
    ) -> Result<(), StoreError> {
        let filter = doc! { "user_id": user_id };
        let update = doc! {
            "$set": { "connected": connected, "last_seen": now },
            "$setOnInsert": {
                "user_id": user_id,
                "report_count": 0_i64,
                "violations": 0_i64,
            },
        };

        self.collection
            .update_one(filter, update)
            .with_options(Self::upsert_options())
            .await?;

        Ok(())
    }

    async fn set_ban(&self, user_id: &str, ban: BanStatus) -> Result<bool, StoreError> {
        let filter = doc! { "user_id": user_id };
        // A ban supersedes any stored quarantine; both fields move in
        // one document update.
        let update = doc! {
            "$set": { "ban": to_bson(&ban)? },
            "$unset": { "quarantine": "" },
        };

        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn clear_ban(&self, user_id: &str) -> Result<(), StoreError> {
        let filter = doc! { "user_id": user_id };
        let update = doc! { "$unset": { "ban": "" } };

        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    async fn set_quarantine(
        &self,
        user_id: &str,
        q: QuarantineStatus,
    ) -> Result<bool, StoreError> {
        let filter = doc! { "user_id": user_id };
        let update = doc! { "$set": { "quarantine": to_bson(&q)? } };

        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn clear_quarantine(&self, user_id: &str) -> Result<(), StoreError> {
        let filter = doc! { "user_id": user_id };
        let update = doc! { "$unset": { "quarantine": "" } };

        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    async fn clear_lapsed_quarantine(&self, user_id: &str, now: i64) -> Result<(), StoreError> {
        // Conditional on the stored window having closed, so a racing
        // re-quarantine is never clobbered by a stale expiry read.
        let filter = doc! {
            "user_id": user_id,
            "quarantine.end_time": { "$lte": now },
        };
        let update = doc! { "$unset": { "quarantine": "" } };

        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    async fn increment_report_count(&self, user_id: &str) -> Result<(), StoreError> {
        let filter = doc! { "user_id": user_id };
        let update = doc! { "$inc": { "report_count": 1_i64 } };

        self.collection.update_one(filter, update).await?;
        Ok(())
    }
}
