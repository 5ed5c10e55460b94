use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// At most one tick waits unconsumed.
const TICK_BUFFER: usize = 1;
/// `interval` rejects a zero period.
const MIN_TICK_PERIOD: Duration = Duration::from_nanos(1);
/// Keeps deadline arithmetic inside `Instant`'s range for tiny rates.
const MAX_TICK_PERIOD: Duration = Duration::from_secs(31_536_000);

/// Turns a request rate into a stream of permission ticks.
///
/// Ticks never arrive ahead of their slot and at most one is buffered, so a
/// slow consumer cannot bank a burst. Once the token is cancelled no further
/// tick is handed out.
pub(crate) struct Pacer {
    ticks: mpsc::Receiver<()>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Pacer {
    pub(crate) fn spawn(throughput: f64, cancel: &CancellationToken) -> Self {
        let period = tick_period(throughput);
        let (tick_tx, ticks) = mpsc::channel(TICK_BUFFER);
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                let permit = tokio::select! {
                    biased;
                    () = task_cancel.cancelled() => break,
                    permit = tick_tx.reserve() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break,
                    },
                };
                tokio::select! {
                    biased;
                    () = task_cancel.cancelled() => break,
                    _ = ticker.tick() => permit.send(()),
                }
            }
            debug!("pacer stopped");
        });

        Self {
            ticks,
            cancel: cancel.clone(),
            handle,
        }
    }

    /// Waits for the next slot. Returns `None` once the run is cancelled.
    pub(crate) async fn tick(&mut self) -> Option<()> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            tick = self.ticks.recv() => tick,
        }
    }
}

impl Drop for Pacer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub(crate) fn tick_period(throughput: f64) -> Duration {
    Duration::try_from_secs_f64(throughput.recip())
        .unwrap_or(MAX_TICK_PERIOD)
        .clamp(MIN_TICK_PERIOD, MAX_TICK_PERIOD)
}
