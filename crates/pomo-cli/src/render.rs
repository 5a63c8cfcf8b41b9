//! Plain-text rendering of driver events.

use pomo_core::timer::{format_duration_ms, Report};
use pomo_core::Event;
use tokio::sync::mpsc;

const PROMPT: &str = "p: pause, r: resume, s: show stats, q: quit";

/// Print every event until the driver drops its sender.
///
/// This task is the only writer to stdout while the session runs, so the
/// command prompt is printed here, after the event that preceded it.
pub async fn print_events(mut events: mpsc::UnboundedReceiver<Event>, json: bool) {
    while let Some(event) = events.recv().await {
        println!("{}", render(&event, json));
        if prompts_after(&event) {
            println!("{PROMPT}");
        }
    }
}

/// Every event but the last one hands control back to the user.
fn prompts_after(event: &Event) -> bool {
    !matches!(event, Event::SessionEnded { .. })
}

pub fn render(event: &Event, json: bool) -> String {
    match event {
        Event::SessionStarted {
            phase, duration_ms, ..
        } => format!("Starting {phase} ({}).", format_duration_ms(*duration_ms)),
        Event::Paused { .. } => "Paused...".to_string(),
        Event::Resumed { .. } => "Resuming...".to_string(),
        Event::AwaitingConfirmation { phase, next, .. } => {
            format!("{phase} is over. Press enter to proceed to {next}.")
        }
        Event::PhaseAdvanced {
            to,
            duration_ms,
            completed_rounds,
            ..
        } => format!(
            "Starting {to} ({}). Completed rounds: {completed_rounds}",
            format_duration_ms(*duration_ms)
        ),
        Event::CommandRejected { input, reason, .. } => {
            format!("Sorry, can't do {input:?}: {reason}")
        }
        Event::StatsSnapshot { report, .. } | Event::SessionEnded { report, .. } => {
            render_report(report, json)
        }
    }
}

fn render_report(report: &Report, json: bool) -> String {
    if json {
        if let Ok(text) = serde_json::to_string_pretty(report) {
            return text;
        }
    }
    report.to_string()
}
