//! Call session model.
//!
//! One document per pairing, keyed by the externally supplied call id.
//! A call is closed exactly once and never reopened.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Call lifecycle state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallState {
    Active,
    Ended,
}

impl CallState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }
}

/// One tracked pairing between two users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Externally supplied session id, unique per call (indexed).
    pub call_id: String,

    pub user1_id: String,
    pub user2_id: String,

    /// Unix timestamp when the pairing was tracked.
    pub start_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,

    pub status: CallState,

    /// Whole seconds, `end_time - start_time`. Present iff ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<String>,
}

impl CallRecord {
    pub fn new(call_id: &str, user1_id: &str, user2_id: &str, now: i64) -> Self {
        Self {
            id: None,
            call_id: call_id.to_string(),
            user1_id: user1_id.to_string(),
            user2_id: user2_id.to_string(),
            start_time: now,
            end_time: None,
            status: CallState::Active,
            duration: None,
            end_reason: None,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.status == CallState::Ended
    }

    /// Elapsed seconds so far, floored at zero.
    pub fn live_duration(&self, now: i64) -> i64 {
        (now - self.start_time).max(0)
    }
}

/// Active call with its duration derived at read time.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveCall {
    #[serde(flatten)]
    pub call: CallRecord,
    /// Seconds since start, computed fresh on every listing.
    pub live_duration: i64,
}
