//! The event loop that owns the session.
//!
//! Clock ticks and user commands arrive on one channel and are applied to
//! the session strictly in arrival order, so no lock is needed around it.
//! Waiting for the user to confirm a phase change is a flag on the driver,
//! not a blocked thread: quitting always gets through.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::events::{timestamp, Event};
use crate::ticker::Ticker;
use crate::timer::{Report, Session};

/// A line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty line.
    Proceed,
    Pause,
    Resume,
    Stats,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse one input line. Surrounding whitespace and case are ignored.
    pub fn parse(line: &str) -> Self {
        let input = line.trim().to_lowercase();
        match input.as_str() {
            "" => Command::Proceed,
            "p" => Command::Pause,
            "r" => Command::Resume,
            "s" => Command::Stats,
            "q" => Command::Quit,
            _ => Command::Unknown(input),
        }
    }

    /// What the user typed, for echoing in rejections.
    pub fn as_input(&self) -> &str {
        match self {
            Command::Proceed => "",
            Command::Pause => "p",
            Command::Resume => "r",
            Command::Stats => "s",
            Command::Quit => "q",
            Command::Unknown(input) => input,
        }
    }
}

/// Everything the driver reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Tick,
    Command(Command),
    /// The input stream hit end-of-file or a read error.
    InputClosed(String),
}

/// What the owner of the loop should do after one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
    InputFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    InputFailed(String),
    /// Every input producer went away without saying why.
    InputsClosed,
}

impl ExitReason {
    /// Process exit code for this outcome.
    pub fn code(&self) -> i32 {
        match self {
            ExitReason::Quit => 0,
            ExitReason::InputFailed(_) | ExitReason::InputsClosed => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub report: Report,
    pub exit: ExitReason,
}

pub struct Driver {
    session: Session,
    events: mpsc::UnboundedSender<Event>,
    awaiting_confirmation: bool,
}

impl Driver {
    pub fn new(session: Session, events: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            session,
            events,
            awaiting_confirmation: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation
    }

    /// Apply one input to the session.
    pub fn handle(&mut self, input: Input) -> Flow {
        match input {
            Input::Tick => {
                self.on_tick();
                Flow::Continue
            }
            Input::Command(Command::Quit) => Flow::Quit,
            Input::Command(command) => {
                self.on_command(command);
                Flow::Continue
            }
            Input::InputClosed(reason) => Flow::InputFailed(reason),
        }
    }

    /// Consume inputs until the user quits or input fails, then stop the
    /// ticker and flush the session.
    ///
    /// The ticker is fully stopped before `end_session` runs, so no tick can
    /// land after the final flush.
    pub async fn run(mut self, mut inputs: mpsc::Receiver<Input>, ticker: Ticker) -> Result<Outcome> {
        self.emit(self.session.started_event());

        let exit = loop {
            let Some(input) = inputs.recv().await else {
                break ExitReason::InputsClosed;
            };
            match self.handle(input) {
                Flow::Continue => {}
                Flow::Quit => break ExitReason::Quit,
                Flow::InputFailed(reason) => break ExitReason::InputFailed(reason),
            }
        };
        debug!(?exit, "driver loop finished");

        ticker.stop().await?;
        let report = self.session.end_session()?;
        self.emit(Event::SessionEnded {
            report: report.clone(),
            at: timestamp(self.session.now_ms()),
        });

        Ok(Outcome { report, exit })
    }

    fn on_tick(&mut self) {
        if self.session.is_paused() || self.awaiting_confirmation {
            return;
        }
        if !self.session.is_round_over() {
            return;
        }

        if self.session.should_auto_progress() {
            self.advance();
        } else {
            self.awaiting_confirmation = true;
            self.emit(Event::AwaitingConfirmation {
                phase: self.session.phase(),
                next: self.session.next_phase(),
                at: timestamp(self.session.now_ms()),
            });
        }
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Proceed => {
                if !self.awaiting_confirmation {
                    debug!("nothing to proceed to");
                } else if self.session.is_paused() {
                    self.reject(&command, "session is paused, resume with 'r' first");
                } else {
                    self.awaiting_confirmation = false;
                    self.advance();
                }
            }
            Command::Pause => match self.session.pause() {
                Ok(event) => self.emit(event),
                Err(e) => self.reject(&command, &e.to_string()),
            },
            Command::Resume => match self.session.unpause() {
                Ok(event) => self.emit(event),
                Err(e) => self.reject(&command, &e.to_string()),
            },
            Command::Stats => self.emit(Event::StatsSnapshot {
                report: self.session.report(),
                at: timestamp(self.session.now_ms()),
            }),
            Command::Unknown(_) => self.reject(&command, "unknown command"),
            // Handled by `handle` before dispatch.
            Command::Quit => {}
        }
    }

    fn advance(&mut self) {
        match self.session.go_to_next_state() {
            Ok(event) => self.emit(event),
            Err(e) => warn!(error = %e, "phase advance refused"),
        }
    }

    fn reject(&self, command: &Command, reason: &str) {
        debug!(input = command.as_input(), reason, "command rejected");
        self.emit(Event::CommandRejected {
            input: command.as_input().to_string(),
            reason: reason.to_string(),
            at: timestamp(self.session.now_ms()),
        });
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }
}
