//! User report model.
//!
//! Reporter, reported, and reason are immutable after submission;
//! only the triage status changes.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Triage status of a report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Reviewed,
    Dismissed,
    Actioned,
}

impl ReportStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "reviewed" => Some(Self::Reviewed),
            "dismissed" => Some(Self::Dismissed),
            "actioned" => Some(Self::Actioned),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Dismissed => "dismissed",
            Self::Actioned => "actioned",
        }
    }
}

/// A user-submitted report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub reporter_id: String,
    pub reported_id: String,
    pub reason: String,

    #[serde(default)]
    pub status: ReportStatus,

    /// Unix timestamp of submission.
    pub timestamp: i64,
}

impl Report {
    pub fn new(reporter_id: &str, reported_id: &str, reason: &str, now: i64) -> Self {
        Self {
            id: ObjectId::new(),
            reporter_id: reporter_id.to_string(),
            reported_id: reported_id.to_string(),
            reason: reason.to_string(),
            status: ReportStatus::Pending,
            timestamp: now,
        }
    }
}

/// Listing filter consumed by the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFilter {
    Pending,
    All,
}
