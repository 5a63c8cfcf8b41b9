//! # pomo Core Library
//!
//! This library provides the core logic for the `pomo` focus timer. The
//! `pomo` binary is a thin terminal layer over it.
//!
//! ## Architecture
//!
//! - **Session**: A wall-clock-based state machine cycling through focus,
//!   short break and long break phases, with pause-exclusive time accounting
//! - **Clock**: The time source seam, so tests can drive simulated time
//! - **Driver**: A single-owner actor that consumes a merged stream of clock
//!   ticks and user commands and owns the session for its whole lifetime
//! - **Ticker**: The periodic wake-up task feeding the driver
//! - **Config**: TOML-based defaults for the command-line flags
//!
//! ## Key Components
//!
//! - [`Session`]: Core timer state machine
//! - [`Driver`]: Event loop owning the session
//! - [`Report`]: Session statistics snapshot
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod ticker;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use driver::{Command, Driver, ExitReason, Flow, Input, Outcome};
pub use error::{ConfigError, CoreError, SessionError};
pub use events::Event;
pub use ticker::Ticker;
pub use timer::{Phase, Report, Session, SessionConfig, SessionStats, TimeUnit};
