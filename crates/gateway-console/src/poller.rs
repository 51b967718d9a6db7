//! Fixed-cadence tick source for the log synchronizer.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// The feed is polled every five seconds; not configurable.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// A repeating task that sends a message immediately and then once per
/// period. It stops when cancelled, dropped, or the receiver goes away.
pub struct PollTask {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PollTask {
    pub fn spawn<M, F>(period: Duration, sender: mpsc::UnboundedSender<M>, tick: F) -> Self
    where
        M: Send + 'static,
        F: Fn() -> M + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = interval.tick() => {
                        if sender.send(tick()).is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("poll task stopped");
        });
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
