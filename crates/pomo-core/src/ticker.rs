//! Periodic wake-ups for the driver.
//!
//! The ticker knows nothing about sessions. It only pushes [`Input::Tick`]
//! into the driver's input channel until it is stopped.

use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::driver::Input;
use crate::error::{CoreError, Result};

pub struct Ticker {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn the tick task. The first tick fires immediately.
    ///
    /// A tick that finds the channel full is dropped rather than queued;
    /// the next one re-evaluates the same state anyway.
    pub fn spawn(period: Duration, inputs: mpsc::Sender<Input>) -> Self {
        let (shutdown, mut stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            debug!(period_ms = period.as_millis() as u64, "ticker started");

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = interval.tick() => match inputs.try_send(Input::Tick) {
                        Ok(()) | Err(TrySendError::Full(_)) => {}
                        Err(TrySendError::Closed(_)) => break,
                    },
                }
            }
            debug!("ticker stopped");
        });

        Self {
            shutdown,
            handle,
        }
    }

    /// Stop ticking and wait until the task has exited.
    ///
    /// Once this returns no further tick can be sent.
    pub async fn stop(self) -> Result<()> {
        let Ticker { shutdown, handle } = self;
        // The task may already be gone if the channel closed.
        let _ = shutdown.send(());
        handle.await.map_err(|e| CoreError::Ticker(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ticks_arrive_until_stopped() {
        let (tx, mut rx) = mpsc::channel(8);
        let ticker = Ticker::spawn(Duration::from_millis(10), tx);

        for _ in 0..2 {
            let input = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("tick in time");
            assert!(matches!(input, Some(Input::Tick)));
        }

        ticker.stop().await.unwrap();

        // The task owned the only sender, so the channel drains and closes.
        let drained = tokio::time::timeout(Duration::from_secs(5), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(drained.is_ok());
    }

    #[tokio::test]
    async fn ticker_exits_when_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(1);
        let ticker = Ticker::spawn(Duration::from_millis(5), tx);
        drop(rx);
        tokio::time::timeout(Duration::from_secs(5), ticker.stop())
            .await
            .expect("stop in time")
            .unwrap();
    }
}
