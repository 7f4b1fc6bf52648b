//! Storage-agnostic store traits.
//!
//! The engine talks to these traits only; the Mongo repositories
//! implement them in production and an in-memory double implements
//! them in tests. Every mutation is an idempotent overwrite of a
//! whole field or sub-document, never a read-modify-write in the
//! engine, so correctness needs nothing beyond the store's
//! per-document atomicity.

use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use super::models::{BanStatus, CallRecord, QuarantineStatus, Report, ReportFilter, ReportStatus, UserRecord};

/// Backend failure (unreachable store, rejected write). Retryable.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(#[from] anyhow::Error);

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        Self(e.into())
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        Self(e.into())
    }
}

/// User documents: presence upserts, moderation sub-document overwrites.
#[allow(async_fn_in_trait)]
pub trait UserStore: Send + Sync {
    async fn find(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert-if-absent, else refresh ip/country/connected/last_seen
    /// without touching moderation fields or counters.
    async fn upsert_presence(
        &self,
        user_id: &str,
        ip: &str,
        country: &str,
        now: i64,
    ) -> Result<(), StoreError>;

    /// Upsert as well: a connection ping may precede registration.
    async fn set_connection(&self, user_id: &str, connected: bool, now: i64)
    -> Result<(), StoreError>;

    /// Overwrite the ban sub-document and drop any stored quarantine
    /// (a ban supersedes it). Returns false when no record matched.
    async fn set_ban(&self, user_id: &str, ban: BanStatus) -> Result<bool, StoreError>;

    /// Unconditional clear; clearing an absent ban is a no-op.
    async fn clear_ban(&self, user_id: &str) -> Result<(), StoreError>;

    /// Replace the quarantine window entirely (no stacking). Returns
    /// false when no record matched.
    async fn set_quarantine(&self, user_id: &str, q: QuarantineStatus)
    -> Result<bool, StoreError>;

    async fn clear_quarantine(&self, user_id: &str) -> Result<(), StoreError>;

    /// Conditional clear used by lazy expiry: removes the quarantine
    /// only if its window has already closed at `now`. Idempotent, so
    /// concurrent lapsed reads may all attempt it safely.
    async fn clear_lapsed_quarantine(&self, user_id: &str, now: i64) -> Result<(), StoreError>;

    /// Plain increment; matches nothing for unknown users.
    async fn increment_report_count(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Call documents: insert-if-absent start, conditional close.
#[allow(async_fn_in_trait)]
pub trait CallStore: Send + Sync {
    /// Returns false when the call id already exists.
    async fn create(&self, call: &CallRecord) -> Result<bool, StoreError>;

    async fn find(&self, call_id: &str) -> Result<Option<CallRecord>, StoreError>;

    /// Close the call iff still active; closing an already-ended call
    /// matches nothing and leaves the stored record untouched.
    async fn finish(
        &self,
        call_id: &str,
        end_time: i64,
        duration: i64,
        reason: &str,
    ) -> Result<(), StoreError>;

    async fn list_active(&self) -> Result<Vec<CallRecord>, StoreError>;
}

/// Report documents.
#[allow(async_fn_in_trait)]
pub trait ReportStore: Send + Sync {
    async fn insert(&self, report: &Report) -> Result<(), StoreError>;

    async fn list(&self, filter: ReportFilter) -> Result<Vec<Report>, StoreError>;

    /// Returns false when no report matched.
    async fn set_status(&self, report_id: &ObjectId, status: ReportStatus)
    -> Result<bool, StoreError>;
}
