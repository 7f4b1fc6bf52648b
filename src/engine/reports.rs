//! User report intake and triage.

use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use tracing::info;

use crate::clock::SharedClock;
use crate::database::models::{Report, ReportFilter, ReportStatus};
use crate::database::store::{ReportStore, UserStore};
use crate::error::EngineError;

pub struct ReportQueue<R, U> {
    reports: Arc<R>,
    users: Arc<U>,
    clock: SharedClock,
}

impl<R: ReportStore, U: UserStore> ReportQueue<R, U> {
    pub fn new(reports: Arc<R>, users: Arc<U>, clock: SharedClock) -> Self {
        Self {
            reports,
            users,
            clock,
        }
    }

    /// File a report and bump the reported user's counter. Reporter,
    /// reported, and reason are immutable from here on.
    pub async fn submit(
        &self,
        reporter_id: &str,
        reported_id: &str,
        reason: &str,
    ) -> Result<Report, EngineError> {
        let reporter_id = require(reporter_id, "reporter id")?;
        let reported_id = require(reported_id, "reported id")?;
        let reason = require(reason, "reason")?;

        if reporter_id == reported_id {
            return Err(EngineError::invalid("users cannot report themselves"));
        }

        let report = Report::new(reporter_id, reported_id, reason, self.clock.now());
        self.reports.insert(&report).await?;
        self.users.increment_report_count(reported_id).await?;

        info!(
            report_id = %report.id,
            reporter_id,
            reported_id,
            "Report submitted"
        );
        Ok(report)
    }

    pub async fn list(&self, filter: ReportFilter) -> Result<Vec<Report>, EngineError> {
        Ok(self.reports.list(filter).await?)
    }

    /// Set the triage status. Any of the four statuses may be set in
    /// any order; the enum is the only constraint.
    pub async fn update_status(
        &self,
        report_id: &str,
        status: ReportStatus,
    ) -> Result<(), EngineError> {
        let report_id = require(report_id, "report id")?;
        let oid = ObjectId::parse_str(report_id)
            .map_err(|_| EngineError::invalid(format!("malformed report id {report_id}")))?;

        if !self.reports.set_status(&oid, status).await? {
            return Err(EngineError::not_found(format!("report {report_id}")));
        }

        info!(report_id, status = status.as_str(), "Report status updated");
        Ok(())
    }
}

fn require<'a>(value: &'a str, what: &str) -> Result<&'a str, EngineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::invalid(format!("{what} is required")));
    }
    Ok(trimmed)
}
