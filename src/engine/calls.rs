//! Call session lifecycle tracking.

use std::sync::Arc;

use tracing::{debug, info};

use crate::clock::SharedClock;
use crate::database::models::{ActiveCall, CallRecord, CallState};
use crate::database::store::CallStore;
use crate::error::EngineError;

pub struct CallTracker<S> {
    calls: Arc<S>,
    clock: SharedClock,
}

impl<S: CallStore> CallTracker<S> {
    pub fn new(calls: Arc<S>, clock: SharedClock) -> Self {
        Self { calls, clock }
    }

    /// Track a new pairing. A duplicate call id is rejected rather
    /// than silently ignored, to surface signaling bugs upstream.
    pub async fn start_call(
        &self,
        call_id: &str,
        user1_id: &str,
        user2_id: &str,
    ) -> Result<CallRecord, EngineError> {
        let call_id = require(call_id, "call id")?;
        let user1_id = require(user1_id, "user1 id")?;
        let user2_id = require(user2_id, "user2 id")?;

        let call = CallRecord::new(call_id, user1_id, user2_id, self.clock.now());
        if !self.calls.create(&call).await? {
            return Err(EngineError::Conflict(format!(
                "call {call_id} already exists"
            )));
        }

        info!(call_id, user1_id, user2_id, "Call started");
        Ok(call)
    }

    /// Close a call. Ending an already-ended call succeeds without
    /// touching the stored record, because retries on the signaling
    /// path are expected.
    pub async fn end_call(&self, call_id: &str, reason: &str) -> Result<CallRecord, EngineError> {
        let call_id = require(call_id, "call id")?;

        let Some(mut call) = self.calls.find(call_id).await? else {
            return Err(EngineError::not_found(format!("call {call_id}")));
        };

        if call.is_ended() {
            debug!(call_id, "Call already ended, no-op");
            return Ok(call);
        }

        let now = self.clock.now();
        let duration = call.live_duration(now);
        self.calls.finish(call_id, now, duration, reason).await?;

        call.status = CallState::Ended;
        call.end_time = Some(now);
        call.duration = Some(duration);
        call.end_reason = Some(reason.to_string());

        info!(call_id, duration, reason, "Call ended");
        Ok(call)
    }

    /// All live calls with their durations derived fresh from the
    /// clock, never cached; callers feed this to monitoring displays.
    pub async fn list_active(&self) -> Result<Vec<ActiveCall>, EngineError> {
        let now = self.clock.now();
        let calls = self.calls.list_active().await?;

        Ok(calls
            .into_iter()
            .map(|call| {
                let live_duration = call.live_duration(now);
                ActiveCall {
                    call,
                    live_duration,
                }
            })
            .collect())
    }
}

fn require<'a>(value: &'a str, what: &str) -> Result<&'a str, EngineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::invalid(format!("{what} is required")));
    }
    Ok(trimmed)
}
