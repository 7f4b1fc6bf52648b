//! Effective access status resolution.
//!
//! The single place where ban precedence and lazy quarantine expiry
//! are evaluated. Every gating path (matchmaking, dashboards, routes)
//! goes through `resolve`; the expiry comparison is never duplicated
//! at call sites.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::clock::SharedClock;
use crate::database::store::UserStore;
use crate::error::EngineError;

/// Status shape consumed by gating logic. `is_quarantined = false`
/// means immediately eligible, with no grace period.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AccessStatus {
    pub is_banned: bool,
    pub is_quarantined: bool,
    /// Present only while a quarantine window is open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

impl AccessStatus {
    fn clear() -> Self {
        Self {
            is_banned: false,
            is_quarantined: false,
            end_time: None,
        }
    }
}

/// Computes a user's effective status from stored state plus current time.
pub struct StatusResolver<S> {
    users: Arc<S>,
    clock: SharedClock,
}

impl<S: UserStore> StatusResolver<S> {
    pub fn new(users: Arc<S>, clock: SharedClock) -> Self {
        Self { users, clock }
    }

    /// Resolve the effective status for a user.
    ///
    /// Unknown users are never pre-emptively restricted (fail-open).
    /// An active ban wins over any quarantine state. A lapsed
    /// quarantine is reported as absent and opportunistically cleared;
    /// the answer stands even when that clear-write is lost, so
    /// concurrent resolutions on the same lapsed record all agree.
    pub async fn resolve(&self, user_id: &str) -> Result<AccessStatus, EngineError> {
        let Some(user) = self.users.find(user_id).await? else {
            return Ok(AccessStatus::clear());
        };

        if user.active_ban().is_some() {
            return Ok(AccessStatus {
                is_banned: true,
                is_quarantined: false,
                end_time: None,
            });
        }

        if let Some(q) = &user.quarantine
            && q.is_quarantined
        {
            let now = self.clock.now();
            if q.is_active(now) {
                return Ok(AccessStatus {
                    is_banned: false,
                    is_quarantined: true,
                    end_time: Some(q.end_time),
                });
            }

            // Lapsed. The clear-on-read below is the engine's only
            // garbage collection for quarantine state; best-effort.
            if let Err(e) = self.users.clear_lapsed_quarantine(user_id, now).await {
                warn!("Failed to clear lapsed quarantine for {}: {}", user_id, e);
            }
        }

        Ok(AccessStatus::clear())
    }
}
