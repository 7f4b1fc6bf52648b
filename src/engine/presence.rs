//! Connection and liveness tracking.
//!
//! Upsert-only: a user record is created the first time the signaling
//! layer sees them, and presence updates never touch moderation
//! fields. There is no deletion path; retention is an external
//! concern.

use std::sync::Arc;

use tracing::debug;

use crate::clock::SharedClock;
use crate::database::models::UserRecord;
use crate::database::store::UserStore;
use crate::error::EngineError;

pub struct PresenceRegistry<S> {
    users: Arc<S>,
    clock: SharedClock,
}

impl<S: UserStore> PresenceRegistry<S> {
    pub fn new(users: Arc<S>, clock: SharedClock) -> Self {
        Self { users, clock }
    }

    /// Register a connecting user, or refresh ip/country/last-seen
    /// for one the store already knows.
    pub async fn register_or_refresh(
        &self,
        user_id: &str,
        ip: &str,
        country: &str,
    ) -> Result<(), EngineError> {
        let user_id = require_user_id(user_id)?;
        self.users
            .upsert_presence(user_id, ip, country, self.clock.now())
            .await?;

        debug!(user_id, country, "Presence refreshed");
        Ok(())
    }

    /// Record a connect/disconnect. Upserts as well, since a
    /// connection ping may arrive before registration.
    pub async fn set_connection(&self, user_id: &str, connected: bool) -> Result<(), EngineError> {
        let user_id = require_user_id(user_id)?;
        self.users
            .set_connection(user_id, connected, self.clock.now())
            .await?;

        debug!(user_id, connected, "Connection state updated");
        Ok(())
    }

    /// Record fetch for admin dashboards.
    pub async fn lookup(&self, user_id: &str) -> Result<Option<UserRecord>, EngineError> {
        Ok(self.users.find(user_id).await?)
    }
}

fn require_user_id(user_id: &str) -> Result<&str, EngineError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(EngineError::invalid("user id is required"));
    }
    Ok(trimmed)
}
