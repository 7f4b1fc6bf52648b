//! Administrator-initiated moderation transitions.
//!
//! Every operation is an idempotent overwrite of a whole sub-document
//! on the user record, so retries after a transient store failure
//! cannot double-apply. Bans and quarantines require the user to
//! exist; the lifting operations are unconditional no-ops when there
//! is nothing to lift.

use std::sync::Arc;

use tracing::info;

use crate::clock::SharedClock;
use crate::database::models::{BanStatus, DEFAULT_REASON, QuarantineStatus};
use crate::database::store::UserStore;
use crate::error::EngineError;

use super::policy::QuarantinePolicy;

pub struct ModerationEngine<S> {
    users: Arc<S>,
    policy: QuarantinePolicy,
    clock: SharedClock,
}

impl<S: UserStore> ModerationEngine<S> {
    pub fn new(users: Arc<S>, policy: QuarantinePolicy, clock: SharedClock) -> Self {
        Self {
            users,
            policy,
            clock,
        }
    }

    /// Ban a user indefinitely. Re-banning overwrites reason and
    /// timestamp; any stored quarantine is superseded.
    pub async fn ban(
        &self,
        user_id: &str,
        reason: &str,
        issued_by: Option<&str>,
    ) -> Result<(), EngineError> {
        let user_id = require_user_id(user_id)?;
        let reason = normalize_reason(reason);
        let ban = BanStatus::new(reason.clone(), self.clock.now(), owned(issued_by));

        if !self.users.set_ban(user_id, ban).await? {
            return Err(EngineError::not_found(format!("user {user_id}")));
        }

        info!(
            user_id,
            admin = issued_by.unwrap_or("-"),
            %reason,
            "User banned"
        );
        Ok(())
    }

    /// Lift a ban. No-op when the user was not banned.
    pub async fn unban(&self, user_id: &str) -> Result<(), EngineError> {
        let user_id = require_user_id(user_id)?;
        self.users.clear_ban(user_id).await?;

        info!(user_id, "User unbanned");
        Ok(())
    }

    /// Quarantine a user. The window length comes from the severity
    /// policy; re-quarantining replaces the window entirely.
    pub async fn quarantine(
        &self,
        user_id: &str,
        reason: &str,
        level: Option<u32>,
        issued_by: Option<&str>,
    ) -> Result<(), EngineError> {
        let user_id = require_user_id(user_id)?;
        let level = level.unwrap_or(1);
        if level == 0 {
            return Err(EngineError::invalid("quarantine level must be positive"));
        }

        let reason = normalize_reason(reason);
        let now = self.clock.now();
        let end = now + self.policy.duration_secs(level);
        let q = QuarantineStatus::new(reason.clone(), level, now, end, owned(issued_by));

        if !self.users.set_quarantine(user_id, q).await? {
            return Err(EngineError::not_found(format!("user {user_id}")));
        }

        info!(
            user_id,
            admin = issued_by.unwrap_or("-"),
            %reason,
            level,
            end_time = end,
            "User quarantined"
        );
        Ok(())
    }

    /// Lift a quarantine unconditionally.
    pub async fn unquarantine(&self, user_id: &str) -> Result<(), EngineError> {
        let user_id = require_user_id(user_id)?;
        self.users.clear_quarantine(user_id).await?;

        info!(user_id, "User unquarantined");
        Ok(())
    }
}

fn require_user_id(user_id: &str) -> Result<&str, EngineError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(EngineError::invalid("user id is required"));
    }
    Ok(trimmed)
}

/// A missing reason never fails the action; it falls back to the sentinel.
fn normalize_reason(reason: &str) -> String {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        DEFAULT_REASON.to_string()
    } else {
        trimmed.to_string()
    }
}

fn owned(s: Option<&str>) -> Option<String> {
    s.map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_support::ManualClock;
    use crate::database::memory::MemoryStore;
    use crate::database::store::UserStore as _;
    use crate::engine::status::StatusResolver;

    const T0: i64 = 1_700_000_000;

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        engine: ModerationEngine<MemoryStore>,
        resolver: StatusResolver<MemoryStore>,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::at(T0);
        let shared: SharedClock = clock.clone();
        let engine = ModerationEngine::new(
            Arc::clone(&store),
            QuarantinePolicy::new(vec![300, 600, 1200]),
            shared.clone(),
        );
        let resolver = StatusResolver::new(Arc::clone(&store), shared);

        store
            .upsert_presence("u1", "198.51.100.4", "FR", T0)
            .await
            .unwrap();

        Fixture {
            store,
            clock,
            engine,
            resolver,
        }
    }

    #[tokio::test]
    async fn ban_unban_round_trip() {
        let f = fixture().await;
        f.engine.ban("u1", "abuse", Some("admin-1")).await.unwrap();
        assert!(f.resolver.resolve("u1").await.unwrap().is_banned);

        f.engine.unban("u1").await.unwrap();
        assert!(!f.resolver.resolve("u1").await.unwrap().is_banned);
    }

    #[tokio::test]
    async fn reban_overwrites_reason_and_timestamp() {
        let f = fixture().await;
        f.engine.ban("u1", "first", None).await.unwrap();

        f.clock.advance(50);
        f.engine.ban("u1", "second", None).await.unwrap();

        let ban = f.store.find("u1").await.unwrap().unwrap().ban.unwrap();
        assert_eq!(ban.reason, "second");
        assert_eq!(ban.timestamp, T0 + 50);
    }

    #[tokio::test]
    async fn empty_reason_uses_sentinel() {
        let f = fixture().await;
        f.engine.ban("u1", "  ", None).await.unwrap();
        let ban = f.store.find("u1").await.unwrap().unwrap().ban.unwrap();
        assert_eq!(ban.reason, DEFAULT_REASON);
    }

    #[tokio::test]
    async fn ban_unknown_user_is_not_found() {
        let f = fixture().await;
        let err = f.engine.ban("nobody", "abuse", None).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn unban_unknown_user_is_noop() {
        let f = fixture().await;
        f.engine.unban("nobody").await.unwrap();
    }

    #[tokio::test]
    async fn empty_user_id_is_invalid() {
        let f = fixture().await;
        let err = f.engine.ban("", "abuse", None).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
        let err = f
            .engine
            .quarantine("  ", "spam", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn higher_level_means_longer_window() {
        let f = fixture().await;

        f.engine
            .quarantine("u1", "spam", Some(1), None)
            .await
            .unwrap();
        let end1 = f
            .store
            .find("u1")
            .await
            .unwrap()
            .unwrap()
            .quarantine
            .unwrap()
            .end_time;

        f.engine
            .quarantine("u1", "spam", Some(2), None)
            .await
            .unwrap();
        let end2 = f
            .store
            .find("u1")
            .await
            .unwrap()
            .unwrap()
            .quarantine
            .unwrap()
            .end_time;

        assert!(end2 > end1, "level 2 window must outlast level 1");
    }

    #[tokio::test]
    async fn requarantine_replaces_the_window() {
        let f = fixture().await;
        f.engine
            .quarantine("u1", "spam", Some(3), None)
            .await
            .unwrap();

        f.clock.advance(100);
        f.engine
            .quarantine("u1", "flood", Some(1), None)
            .await
            .unwrap();

        let q = f.store.find("u1").await.unwrap().unwrap().quarantine.unwrap();
        assert_eq!(q.reason, "flood");
        assert_eq!(q.level, 1);
        assert_eq!(q.start_time, T0 + 100);
        assert_eq!(q.end_time, T0 + 100 + 300);
    }

    #[tokio::test]
    async fn level_zero_is_invalid() {
        let f = fixture().await;
        let err = f
            .engine
            .quarantine("u1", "spam", Some(0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn level_defaults_to_one() {
        let f = fixture().await;
        f.engine.quarantine("u1", "spam", None, None).await.unwrap();
        let q = f.store.find("u1").await.unwrap().unwrap().quarantine.unwrap();
        assert_eq!(q.level, 1);
        assert_eq!(q.end_time, T0 + 300);
    }

    #[tokio::test]
    async fn ban_supersedes_quarantine() {
        let f = fixture().await;
        f.engine
            .quarantine("u1", "spam", Some(2), None)
            .await
            .unwrap();
        f.engine.ban("u1", "abuse", None).await.unwrap();

        let user = f.store.find("u1").await.unwrap().unwrap();
        assert!(user.ban.is_some());
        assert!(user.quarantine.is_none());
    }

    #[tokio::test]
    async fn unquarantine_clears_unconditionally() {
        let f = fixture().await;
        f.engine.quarantine("u1", "spam", None, None).await.unwrap();
        f.engine.unquarantine("u1").await.unwrap();
        assert!(f.store.find("u1").await.unwrap().unwrap().quarantine.is_none());

        // And again, with nothing to clear.
        f.engine.unquarantine("u1").await.unwrap();
    }
}
