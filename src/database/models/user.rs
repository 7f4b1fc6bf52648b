//! User record with embedded moderation state.
//!
//! One document per participant, keyed by the opaque `user_id` the
//! signaling layer assigns. Ban and quarantine live as optional
//! sub-documents so moderation writes are whole-field overwrites.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Sentinel used when a ban/quarantine arrives without a reason.
pub const DEFAULT_REASON: &str = "Violation of terms";

/// Indefinite restriction. Lifted only by an explicit unban.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanStatus {
    pub is_banned: bool,
    pub reason: String,
    /// Unix timestamp when the ban was issued.
    pub timestamp: i64,
    /// Acting administrator, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_by: Option<String>,
}

impl BanStatus {
    pub fn new(reason: String, now: i64, issued_by: Option<String>) -> Self {
        Self {
            is_banned: true,
            reason,
            timestamp: now,
            issued_by,
        }
    }
}

/// Time-bounded restriction. Severity level controls the window length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarantineStatus {
    pub is_quarantined: bool,
    pub reason: String,
    /// Severity, >= 1.
    pub level: u32,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_by: Option<String>,
}

impl QuarantineStatus {
    pub fn new(reason: String, level: u32, start: i64, end: i64, issued_by: Option<String>) -> Self {
        Self {
            is_quarantined: true,
            reason,
            level,
            start_time: start,
            end_time: end,
            issued_by,
        }
    }

    /// A lapsed quarantine is treated as absent by every reader,
    /// whether or not the stored field has been cleared yet.
    pub fn is_active(&self, now: i64) -> bool {
        self.is_quarantined && now < self.end_time
    }
}

/// Participant document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Opaque id, stable across reconnects (indexed).
    pub user_id: String,

    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub connected: bool,
    /// Unix timestamp of the last presence update.
    pub last_seen: i64,

    #[serde(default)]
    pub report_count: i64,
    #[serde(default)]
    pub violations: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarantine: Option<QuarantineStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ban: Option<BanStatus>,
}

impl UserRecord {
    /// Fresh record for a first presence registration.
    #[allow(dead_code)]
    pub fn new(user_id: &str, ip: &str, country: &str, now: i64) -> Self {
        Self {
            id: None,
            user_id: user_id.to_string(),
            ip: Some(ip.to_string()),
            country: Some(country.to_string()),
            connected: true,
            last_seen: now,
            report_count: 0,
            violations: 0,
            quarantine: None,
            ban: None,
        }
    }

    pub fn active_ban(&self) -> Option<&BanStatus> {
        self.ban.as_ref().filter(|b| b.is_banned)
    }
}
