//! Report repository.

use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, to_bson};
use mongodb::options::FindOptions;

use crate::database::Database;
use crate::database::models::{Report, ReportFilter, ReportStatus};
use crate::database::store::{ReportStore, StoreError};

pub struct ReportRepository {
    collection: Collection<Report>,
}

impl ReportRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("reports"),
        }
    }
}

impl ReportStore for ReportRepository {
    async fn insert(&self, report: &Report) -> Result<(), StoreError> {
        self.collection.insert_one(report).await?;
        Ok(())
    }

    async fn list(&self, filter: ReportFilter) -> Result<Vec<Report>, StoreError> {
        let filter = match filter {
            ReportFilter::Pending => doc! { "status": ReportStatus::Pending.as_str() },
            ReportFilter::All => doc! {},
        };
        let options = FindOptions::builder()
            .sort(doc! { "timestamp": -1 })
            .build();

        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn set_status(
        &self,
        report_id: &ObjectId,
        status: ReportStatus,
    ) -> Result<bool, StoreError> {
        let filter = doc! { "_id": *report_id };
        let update = doc! { "$set": { "status": to_bson(&status)? } };

        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }
}
