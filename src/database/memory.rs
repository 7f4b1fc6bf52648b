//! In-memory store double for engine tests.
//!
//! Implements all three store traits over process-local maps, with a
//! toggle that makes every write fail while reads keep working. That
//! toggle is what exercises the lazy-expiry contract: the resolver
//! must return the lapsed answer even when its opportunistic clear
//! is dropped.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use mongodb::bson::oid::ObjectId;
use parking_lot::RwLock;

use super::models::{
    BanStatus, CallRecord, CallState, QuarantineStatus, Report, ReportFilter, ReportStatus,
    UserRecord,
};
use super::store::{CallStore, ReportStore, StoreError, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, UserRecord>,
    calls: DashMap<String, CallRecord>,
    reports: RwLock<Vec<Report>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a transient store error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn write_allowed(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::from(anyhow!("injected write failure")));
        }
        Ok(())
    }
}

impl UserStore for MemoryStore {
    async fn find(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(user_id).map(|u| u.clone()))
    }

    async fn upsert_presence(
        &self,
        user_id: &str,
        ip: &str,
        country: &str,
        now: i64,
    ) -> Result<(), StoreError> {
        self.write_allowed()?;
        match self.users.entry(user_id.to_string()) {
            Entry::Occupied(mut e) => {
                let user = e.get_mut();
                user.ip = Some(ip.to_string());
                user.country = Some(country.to_string());
                user.connected = true;
                user.last_seen = now;
            }
            Entry::Vacant(e) => {
                e.insert(UserRecord::new(user_id, ip, country, now));
            }
        }
        Ok(())
    }

    async fn set_connection(
        &self,
        user_id: &str,
        connected: bool,
        now: i64,
    ) -> Result<(), StoreError> {
        self.write_allowed()?;
        match self.users.entry(user_id.to_string()) {
            Entry::Occupied(mut e) => {
                let user = e.get_mut();
                user.connected = connected;
                user.last_seen = now;
            }
            Entry::Vacant(e) => {
                let mut user = UserRecord::new(user_id, "", "", now);
                user.ip = None;
                user.country = None;
                user.connected = connected;
                e.insert(user);
            }
        }
        Ok(())
    }

    async fn set_ban(&self, user_id: &str, ban: BanStatus) -> Result<bool, StoreError> {
        self.write_allowed()?;
        match self.users.get_mut(user_id) {
            Some(mut user) => {
                user.ban = Some(ban);
                user.quarantine = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_ban(&self, user_id: &str) -> Result<(), StoreError> {
        self.write_allowed()?;
        if let Some(mut user) = self.users.get_mut(user_id) {
            user.ban = None;
        }
        Ok(())
    }

    async fn set_quarantine(
        &self,
        user_id: &str,
        q: QuarantineStatus,
    ) -> Result<bool, StoreError> {
        self.write_allowed()?;
        match self.users.get_mut(user_id) {
            Some(mut user) => {
                user.quarantine = Some(q);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_quarantine(&self, user_id: &str) -> Result<(), StoreError> {
        self.write_allowed()?;
        if let Some(mut user) = self.users.get_mut(user_id) {
            user.quarantine = None;
        }
        Ok(())
    }

    async fn clear_lapsed_quarantine(&self, user_id: &str, now: i64) -> Result<(), StoreError> {
        self.write_allowed()?;
        if let Some(mut user) = self.users.get_mut(user_id)
            && let Some(q) = &user.quarantine
            && q.end_time <= now
        {
            user.quarantine = None;
        }
        Ok(())
    }

    async fn increment_report_count(&self, user_id: &str) -> Result<(), StoreError> {
        self.write_allowed()?;
        if let Some(mut user) = self.users.get_mut(user_id) {
            user.report_count += 1;
        }
        Ok(())
    }
}

impl CallStore for MemoryStore {
    async fn create(&self, call: &CallRecord) -> Result<bool, StoreError> {
        self.write_allowed()?;
        match self.calls.entry(call.call_id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(e) => {
                e.insert(call.clone());
                Ok(true)
            }
        }
    }

    async fn find(&self, call_id: &str) -> Result<Option<CallRecord>, StoreError> {
        Ok(self.calls.get(call_id).map(|c| c.clone()))
    }

    async fn finish(
        &self,
        call_id: &str,
        end_time: i64,
        duration: i64,
        reason: &str,
    ) -> Result<(), StoreError> {
        self.write_allowed()?;
        if let Some(mut call) = self.calls.get_mut(call_id)
            && call.status == CallState::Active
        {
            call.status = CallState::Ended;
            call.end_time = Some(end_time);
            call.duration = Some(duration);
            call.end_reason = Some(reason.to_string());
        }
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<CallRecord>, StoreError> {
        Ok(self
            .calls
            .iter()
            .filter(|c| c.status == CallState::Active)
            .map(|c| c.clone())
            .collect())
    }
}

impl ReportStore for MemoryStore {
    async fn insert(&self, report: &Report) -> Result<(), StoreError> {
        self.write_allowed()?;
        self.reports.write().push(report.clone());
        Ok(())
    }

    async fn list(&self, filter: ReportFilter) -> Result<Vec<Report>, StoreError> {
        let mut reports: Vec<Report> = self
            .reports
            .read()
            .iter()
            .filter(|r| filter == ReportFilter::All || r.status == ReportStatus::Pending)
            .cloned()
            .collect();
        reports.sort_by_key(|r| std::cmp::Reverse(r.timestamp));
        Ok(reports)
    }

    async fn set_status(
        &self,
        report_id: &ObjectId,
        status: ReportStatus,
    ) -> Result<bool, StoreError> {
        self.write_allowed()?;
        let mut reports = self.reports.write();
        match reports.iter_mut().find(|r| r.id == *report_id) {
            Some(report) => {
                report.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
