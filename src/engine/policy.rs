//! Quarantine severity policy.
//!
//! Maps a severity level to a window length in seconds. The table is
//! configuration, but strict monotonicity (higher level, longer
//! window) is a hard contract the rest of the engine relies on.

use tracing::warn;

/// Default windows: 1h, 6h, 24h for levels 1-3.
const DEFAULT_LEVELS: [i64; 3] = [3600, 21600, 86400];

/// Level -> duration table.
#[derive(Debug, Clone)]
pub struct QuarantinePolicy {
    durations: Vec<i64>,
}

impl Default for QuarantinePolicy {
    fn default() -> Self {
        Self {
            durations: DEFAULT_LEVELS.to_vec(),
        }
    }
}

impl QuarantinePolicy {
    /// Build a policy from a configured table. Falls back to the
    /// default table when the input is empty, non-positive, or not
    /// strictly increasing.
    pub fn new(durations: Vec<i64>) -> Self {
        let valid = !durations.is_empty()
            && durations[0] > 0
            && durations.windows(2).all(|w| w[0] < w[1]);

        if valid {
            Self { durations }
        } else {
            warn!(
                "Ignoring invalid quarantine level table {:?}, using defaults",
                durations
            );
            Self::default()
        }
    }

    /// Window length in seconds for a severity level (level >= 1).
    /// Levels past the table extend linearly from the last entry, so
    /// monotonicity holds for any level.
    pub fn duration_secs(&self, level: u32) -> i64 {
        let len = self.durations.len();
        let level = level.max(1) as usize;

        if level <= len {
            self.durations[level - 1]
        } else {
            let last = self.durations[len - 1];
            last * (level - len + 1) as i64
        }
    }
}
