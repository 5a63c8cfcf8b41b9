//! Human-readable session statistics.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Phase;

/// Snapshot of a session's accumulated statistics.
///
/// Produced by [`super::Session::report`] at any time, including mid-session.
/// Focus and break totals only include finished phases until the session is
/// ended, at which point the running phase is booked as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub started_at: DateTime<Utc>,
    pub focus_ms: u64,
    pub paused_ms: u64,
    pub break_ms: u64,
    /// Wall-clock time since the session started, frozen once it ends.
    pub elapsed_ms: u64,
    pub completed_rounds: u32,
    pub phase: Phase,
    pub paused: bool,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "----Session Stats----")?;
        writeln!(f, "Time in focus: {}", format_duration_ms(self.focus_ms))?;
        writeln!(f, "Time spent paused: {}", format_duration_ms(self.paused_ms))?;
        writeln!(f, "Time spent in breaks: {}", format_duration_ms(self.break_ms))?;
        writeln!(f, "Total elapsed time: {}", format_duration_ms(self.elapsed_ms))?;
        writeln!(f, "Completed rounds: {}", self.completed_rounds)?;
        if self.paused {
            write!(f, "Current phase: {} (paused)", self.phase)
        } else {
            write!(f, "Current phase: {}", self.phase)
        }
    }
}

/// Formats milliseconds as `1h 02m 03s`, `2m 03s` or `3s`.
pub fn format_duration_ms(ms: u64) -> String {
    let total_secs = ms / 1_000;
    let hours = total_secs / 3_600;
    let mins = (total_secs % 3_600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{hours}h {mins:02}m {secs:02}s")
    } else if mins > 0 {
        format!("{mins}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}
