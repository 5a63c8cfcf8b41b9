//! Session state machine.
//!
//! The session is a wall-clock-based state machine. It does not use internal
//! threads; the owner is responsible for asking [`Session::is_round_over`]
//! periodically and calling [`Session::go_to_next_state`] when it is.
//!
//! ## State Transitions
//!
//! ```text
//! Focus -> (ShortBreak | LongBreak) -> Focus -> ...
//! ```
//!
//! Paused time never counts toward a phase: on resume the phase start is
//! shifted forward by the length of the pause.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Phase, Report, SessionConfig};
use crate::clock::Clock;
use crate::error::SessionError;
use crate::events::{timestamp, Event};

/// Accumulated statistics, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub started_ms: u64,
    pub paused_ms: u64,
    pub focus_ms: u64,
    pub break_ms: u64,
    pub completed_rounds: u32,
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    stats: SessionStats,
    phase: Phase,
    /// When the current phase began, shifted forward by every pause.
    phase_started_ms: u64,
    /// `Some(start)` exactly while paused.
    paused_since: Option<u64>,
    ended_ms: Option<u64>,
}

impl Session {
    /// Start a session in the focus phase with zeroed statistics.
    pub fn new(config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_ms();
        debug!(?config, "session initialized");
        Self {
            config,
            clock,
            stats: SessionStats {
                started_ms: now,
                ..SessionStats::default()
            },
            phase: Phase::Focus,
            phase_started_ms: now,
            paused_since: None,
            ended_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current reading of the session's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn completed_rounds(&self) -> u32 {
        self.stats.completed_rounds
    }

    pub fn phase_started_ms(&self) -> u64 {
        self.phase_started_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    pub fn is_ended(&self) -> bool {
        self.ended_ms.is_some()
    }

    pub fn should_auto_progress(&self) -> bool {
        self.config.auto
    }

    pub fn phase_duration_ms(&self, phase: Phase) -> u64 {
        self.config.phase_duration_ms(phase)
    }

    /// Pause-exclusive time spent in the current phase.
    ///
    /// While paused the value is frozen at the moment the pause began.
    pub fn elapsed_in_phase_ms(&self) -> u64 {
        let now = self.paused_since.unwrap_or_else(|| self.clock.now_ms());
        now.saturating_sub(self.phase_started_ms)
    }

    pub fn remaining_ms(&self) -> u64 {
        self.phase_duration_ms(self.phase)
            .saturating_sub(self.elapsed_in_phase_ms())
    }

    /// True once the phase has run strictly longer than its duration.
    ///
    /// A reading exactly on the boundary is not over yet.
    pub fn is_round_over(&self) -> bool {
        self.elapsed_in_phase_ms() > self.phase_duration_ms(self.phase)
    }

    /// The phase `go_to_next_state` would move to from here.
    pub fn next_phase(&self) -> Phase {
        match self.phase {
            Phase::Focus => {
                if (self.stats.completed_rounds + 1) % self.config.rounds.get() == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Focus,
        }
    }

    /// Snapshot of the statistics. Never mutates the session.
    pub fn report(&self) -> Report {
        let now = self.ended_ms.unwrap_or_else(|| self.clock.now_ms());
        Report {
            started_at: timestamp(self.stats.started_ms),
            focus_ms: self.stats.focus_ms,
            paused_ms: self.stats.paused_ms,
            break_ms: self.stats.break_ms,
            elapsed_ms: now.saturating_sub(self.stats.started_ms),
            completed_rounds: self.stats.completed_rounds,
            phase: self.phase,
            paused: self.is_paused(),
        }
    }

    /// The event announcing the first focus phase.
    pub fn started_event(&self) -> Event {
        Event::SessionStarted {
            phase: self.phase,
            duration_ms: self.phase_duration_ms(self.phase),
            at: timestamp(self.stats.started_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn pause(&mut self) -> Result<Event, SessionError> {
        self.ensure_running()?;
        if self.is_paused() {
            return Err(SessionError::AlreadyPaused);
        }

        let now = self.clock.now_ms();
        self.paused_since = Some(now);
        debug!(phase = %self.phase, "session paused");
        Ok(Event::Paused {
            phase: self.phase,
            remaining_ms: self.remaining_ms(),
            at: timestamp(now),
        })
    }

    pub fn unpause(&mut self) -> Result<Event, SessionError> {
        self.ensure_running()?;
        let since = self.paused_since.take().ok_or(SessionError::NotPaused)?;

        let now = self.clock.now_ms();
        let paused = now.saturating_sub(since);
        self.stats.paused_ms += paused;
        self.phase_started_ms += paused;
        debug!(phase = %self.phase, paused_ms = paused, "session resumed");
        Ok(Event::Resumed {
            phase: self.phase,
            paused_ms: paused,
            remaining_ms: self.remaining_ms(),
            at: timestamp(now),
        })
    }

    /// Book the finished phase and move to the next one.
    ///
    /// Only valid when the round is over and the session is not paused.
    pub fn go_to_next_state(&mut self) -> Result<Event, SessionError> {
        self.ensure_running()?;
        if self.is_paused() {
            return Err(SessionError::Paused);
        }
        let elapsed = self.elapsed_in_phase_ms();
        let required = self.phase_duration_ms(self.phase);
        if elapsed <= required {
            return Err(SessionError::RoundNotOver {
                elapsed_ms: elapsed,
                required_ms: required,
            });
        }

        let from = self.phase;
        let to = self.next_phase();
        self.book(from, elapsed);
        if from == Phase::Focus {
            self.stats.completed_rounds += 1;
        }
        self.phase = to;
        let now = self.clock.now_ms();
        self.phase_started_ms = now;

        debug!(%from, %to, rounds = self.stats.completed_rounds, "phase advanced");
        Ok(Event::PhaseAdvanced {
            from,
            to,
            completed_rounds: self.stats.completed_rounds,
            duration_ms: self.phase_duration_ms(to),
            at: timestamp(now),
        })
    }

    /// Flush all outstanding time into the statistics. Single-shot.
    pub fn end_session(&mut self) -> Result<Report, SessionError> {
        if self.is_ended() {
            return Err(SessionError::AlreadyEnded);
        }
        if self.is_paused() {
            self.unpause()?;
        }

        let elapsed = self.elapsed_in_phase_ms();
        self.book(self.phase, elapsed);
        let now = self.clock.now_ms();
        self.phase_started_ms = now;
        self.ended_ms = Some(now);
        debug!(phase = %self.phase, "session ended");
        Ok(self.report())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ensure_running(&self) -> Result<(), SessionError> {
        if self.is_ended() {
            Err(SessionError::Ended)
        } else {
            Ok(())
        }
    }

    fn book(&mut self, phase: Phase, elapsed_ms: u64) {
        if phase.is_break() {
            self.stats.break_ms += elapsed_ms;
        } else {
            self.stats.focus_ms += elapsed_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::clock::ManualClock;
    use crate::timer::TimeUnit;

    const START_MS: u64 = 1_700_000_000_000;

    fn seconds_config(rounds: u32, focus: u32, short: u32, long: u32) -> SessionConfig {
        SessionConfig {
            rounds: NonZeroU32::new(rounds).unwrap(),
            short,
            long,
            focus,
            auto: false,
            unit: TimeUnit::Seconds,
        }
    }

    fn session(config: SessionConfig) -> (Session, ManualClock) {
        let clock = ManualClock::new(START_MS);
        (Session::new(config, Arc::new(clock.clone())), clock)
    }

    /// Run the current phase just past its end and advance.
    fn finish_phase(s: &mut Session, clock: &ManualClock) -> Phase {
        clock.advance_ms(s.remaining_ms() + 1);
        s.go_to_next_state().unwrap();
        s.phase()
    }

    #[test]
    fn new_session_starts_in_focus() {
        let (s, _) = session(seconds_config(3, 25, 5, 15));
        assert_eq!(s.phase(), Phase::Focus);
        assert!(!s.is_paused());
        assert_eq!(s.completed_rounds(), 0);
        assert_eq!(s.stats().started_ms, START_MS);
        assert_eq!(s.phase_started_ms(), START_MS);
    }

    #[test]
    fn round_is_not_over_exactly_on_the_boundary() {
        let (s, clock) = session(seconds_config(3, 2, 1, 1));
        clock.advance_ms(1_999);
        assert!(!s.is_round_over());
        clock.advance_ms(1);
        assert!(!s.is_round_over());
        clock.advance_ms(1);
        assert!(s.is_round_over());
    }

    #[test]
    fn single_round_cycle_goes_straight_to_long_break() {
        let (mut s, clock) = session(seconds_config(1, 1, 1, 1));
        clock.advance_ms(1_100);
        assert!(s.is_round_over());

        let event = s.go_to_next_state().unwrap();
        assert_eq!(s.phase(), Phase::LongBreak);
        assert_eq!(s.completed_rounds(), 1);
        assert!(matches!(
            event,
            Event::PhaseAdvanced {
                from: Phase::Focus,
                to: Phase::LongBreak,
                completed_rounds: 1,
                ..
            }
        ));
    }

    #[test]
    fn long_break_every_third_round() {
        let (mut s, clock) = session(seconds_config(3, 2, 1, 1));
        let phases: Vec<Phase> = (0..8).map(|_| finish_phase(&mut s, &clock)).collect();
        assert_eq!(
            phases,
            vec![
                Phase::ShortBreak,
                Phase::Focus,
                Phase::ShortBreak,
                Phase::Focus,
                Phase::LongBreak,
                Phase::Focus,
                Phase::ShortBreak,
                Phase::Focus,
            ]
        );
        assert_eq!(s.completed_rounds(), 4);
    }

    #[test]
    fn break_completion_does_not_count_a_round() {
        let (mut s, clock) = session(seconds_config(3, 1, 1, 1));
        finish_phase(&mut s, &clock);
        assert_eq!(s.completed_rounds(), 1);
        finish_phase(&mut s, &clock);
        assert_eq!(s.phase(), Phase::Focus);
        assert_eq!(s.completed_rounds(), 1);
    }

    #[test]
    fn pause_right_after_start_is_excluded_from_the_phase() {
        let (mut s, clock) = session(seconds_config(3, 25, 5, 15));
        s.pause().unwrap();
        clock.advance_ms(5_000);
        s.unpause().unwrap();

        assert_eq!(s.stats().paused_ms, 5_000);
        assert_eq!(s.phase(), Phase::Focus);
        assert_eq!(s.phase_started_ms(), START_MS + 5_000);
        assert_eq!(s.elapsed_in_phase_ms(), 0);
        assert!(!s.is_round_over());
    }

    #[test]
    fn elapsed_is_frozen_while_paused() {
        let (mut s, clock) = session(seconds_config(3, 2, 1, 1));
        clock.advance_ms(1_500);
        s.pause().unwrap();
        clock.advance_ms(60_000);
        assert_eq!(s.elapsed_in_phase_ms(), 1_500);
        assert!(!s.is_round_over());
    }

    #[test]
    fn double_pause_is_rejected_without_moving_the_pause_start() {
        let (mut s, clock) = session(seconds_config(3, 25, 5, 15));
        s.pause().unwrap();
        clock.advance_ms(3_000);
        assert_eq!(s.pause(), Err(SessionError::AlreadyPaused));
        clock.advance_ms(2_000);
        s.unpause().unwrap();
        assert_eq!(s.stats().paused_ms, 5_000);
    }

    #[test]
    fn unpause_when_running_is_rejected() {
        let (mut s, _) = session(seconds_config(3, 25, 5, 15));
        assert_eq!(s.unpause(), Err(SessionError::NotPaused));
        assert_eq!(s.stats().paused_ms, 0);
        assert_eq!(s.phase_started_ms(), START_MS);
    }

    #[test]
    fn advancing_early_is_rejected() {
        let (mut s, clock) = session(seconds_config(3, 2, 1, 1));
        clock.advance_ms(2_000);
        assert_eq!(
            s.go_to_next_state(),
            Err(SessionError::RoundNotOver {
                elapsed_ms: 2_000,
                required_ms: 2_000,
            })
        );
        assert_eq!(s.phase(), Phase::Focus);
        assert_eq!(s.stats().focus_ms, 0);
    }

    #[test]
    fn advancing_while_paused_is_rejected() {
        let (mut s, clock) = session(seconds_config(3, 1, 1, 1));
        clock.advance_ms(5_000);
        s.pause().unwrap();
        assert_eq!(s.go_to_next_state(), Err(SessionError::Paused));
        assert_eq!(s.completed_rounds(), 0);
    }

    #[test]
    fn phase_time_is_booked_into_the_phase_being_left() {
        let (mut s, clock) = session(seconds_config(3, 2, 1, 1));
        clock.advance_ms(2_500);
        s.go_to_next_state().unwrap();
        clock.advance_ms(1_200);
        s.go_to_next_state().unwrap();

        assert_eq!(s.stats().focus_ms, 2_500);
        assert_eq!(s.stats().break_ms, 1_200);
    }

    #[test]
    fn end_session_flushes_pause_and_current_phase() {
        let (mut s, clock) = session(seconds_config(3, 25, 5, 15));
        clock.advance_ms(4_000);
        s.pause().unwrap();
        clock.advance_ms(3_000);

        let report = s.end_session().unwrap();
        assert_eq!(report.focus_ms, 4_000);
        assert_eq!(report.paused_ms, 3_000);
        assert_eq!(report.elapsed_ms, 7_000);
        assert!(!report.paused);
        assert!(s.is_ended());
    }

    #[test]
    fn end_session_is_single_shot() {
        let (mut s, clock) = session(seconds_config(3, 25, 5, 15));
        clock.advance_ms(4_000);
        let first = s.end_session().unwrap();

        clock.advance_ms(4_000);
        assert_eq!(s.end_session(), Err(SessionError::AlreadyEnded));
        assert_eq!(s.report(), first);
        assert_eq!(s.stats().focus_ms, 4_000);
    }

    #[test]
    fn mutations_after_end_are_rejected() {
        let (mut s, clock) = session(seconds_config(3, 1, 1, 1));
        s.end_session().unwrap();
        clock.advance_ms(10_000);
        assert_eq!(s.pause(), Err(SessionError::Ended));
        assert_eq!(s.unpause(), Err(SessionError::Ended));
        assert_eq!(s.go_to_next_state(), Err(SessionError::Ended));
    }

    #[test]
    fn statistics_are_conserved() {
        let (mut s, clock) = session(seconds_config(2, 3, 1, 2));
        clock.advance_ms(3_400);
        s.go_to_next_state().unwrap();
        clock.advance_ms(500);
        s.pause().unwrap();
        clock.advance_ms(7_000);
        s.unpause().unwrap();
        clock.advance_ms(900);
        s.go_to_next_state().unwrap();
        clock.advance_ms(1_000);

        let r = s.end_session().unwrap();
        assert_eq!(r.focus_ms + r.break_ms + r.paused_ms, r.elapsed_ms);
        assert_eq!(r.elapsed_ms, 3_400 + 500 + 7_000 + 900 + 1_000);
    }

    #[test]
    fn report_is_read_only() {
        let (s, clock) = session(seconds_config(3, 25, 5, 15));
        clock.advance_ms(1_000);
        let before = *s.stats();
        let report = s.report();
        assert_eq!(report.elapsed_ms, 1_000);
        assert_eq!(report.focus_ms, 0);
        assert_eq!(*s.stats(), before);
    }

    #[test]
    fn auto_progress_mirrors_config() {
        let mut config = seconds_config(3, 25, 5, 15);
        assert!(!session(config).0.should_auto_progress());
        config.auto = true;
        assert!(session(config).0.should_auto_progress());
    }
}
