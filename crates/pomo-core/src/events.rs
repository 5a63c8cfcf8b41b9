use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, Report};

/// Every state change in the system produces an Event.
/// The terminal front end renders them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        phase: Phase,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    Paused {
        phase: Phase,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    Resumed {
        phase: Phase,
        paused_ms: u64,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// The current phase ran out and the driver is waiting for the user to
    /// confirm before moving on.
    AwaitingConfirmation {
        phase: Phase,
        next: Phase,
        at: DateTime<Utc>,
    },
    PhaseAdvanced {
        from: Phase,
        to: Phase,
        completed_rounds: u32,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// A user command that could not be applied. No state changed.
    CommandRejected {
        input: String,
        reason: String,
        at: DateTime<Utc>,
    },
    StatsSnapshot {
        report: Report,
        at: DateTime<Utc>,
    },
    SessionEnded {
        report: Report,
        at: DateTime<Utc>,
    },
}

/// Converts a clock reading to the timestamp stamped on events.
pub fn timestamp(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}
