mod phase;
mod report;
mod session;

pub use phase::{Phase, SessionConfig, TimeUnit};
pub use report::{format_duration_ms, Report};
pub use session::{Session, SessionStats};
