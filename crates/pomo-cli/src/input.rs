//! Foreground input loop: one line from stdin per command.

use pomo_core::{Command, Input};
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::mpsc;

/// How the "Press enter to begin..." prompt was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Start {
    Begin,
    Quit,
    /// End of input or a read error before anything started.
    Closed(String),
}

/// Prompt until the user starts or quits.
///
/// Every other line is echoed back as a rejection and the prompt repeats.
pub async fn wait_for_start<R>(lines: &mut Lines<R>) -> Start
where
    R: AsyncBufRead + Unpin,
{
    loop {
        println!("Press enter to begin...");
        let command = match lines.next_line().await {
            Ok(Some(line)) => Command::parse(&line),
            Ok(None) => return Start::Closed("input closed before the session started".into()),
            Err(e) => return Start::Closed(format!("failed to read input: {e}")),
        };

        let reason = match command {
            Command::Proceed => return Start::Begin,
            Command::Quit => return Start::Quit,
            Command::Pause | Command::Resume | Command::Stats => "session has not started",
            Command::Unknown(_) => "unknown command",
        };
        println!("Sorry, can't do {:?}: {reason}", command.as_input());
    }
}

/// Forward parsed lines to the driver until the user quits, input ends,
/// or the driver stops listening.
pub async fn read_commands<R>(mut lines: Lines<R>, inputs: mpsc::Sender<Input>)
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let input = match lines.next_line().await {
            Ok(Some(line)) => Input::Command(Command::parse(&line)),
            Ok(None) => Input::InputClosed("end of input".to_string()),
            Err(e) => Input::InputClosed(format!("failed to read input: {e}")),
        };

        let last = matches!(
            input,
            Input::InputClosed(_) | Input::Command(Command::Quit)
        );
        if inputs.send(input).await.is_err() || last {
            break;
        }
    }
}
