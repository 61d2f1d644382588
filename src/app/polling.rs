use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A running fixed-period timer that can be cancelled deterministically.
///
/// The first tick fires one period after start. Once cancelled (or dropped)
/// the callback is never invoked again.
pub struct PollingScope {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollingScope {
    /// Start calling `on_tick` every `period` until `token` is cancelled.
    pub fn spawn<F>(period: Duration, token: CancellationToken, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => {
                        debug!("polling scope cancelled");
                        break;
                    }
                    _ = ticker.tick() => on_tick(),
                }
            }
        });

        Self { token, handle }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PollingScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
