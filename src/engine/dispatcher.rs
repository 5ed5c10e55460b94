use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::pacer::Pacer;
use super::worker::{Dispatch, ScenarioJob};

/// Hands `count` dispatches to the worker queue, one per pacer tick.
///
/// Stops early when the pacer reports cancellation; a tick that was taken is
/// always delivered. Returns the number of dispatches sent. The queue closes
/// when this returns and the sender is dropped.
pub(crate) async fn dispatch(
    job: Arc<ScenarioJob>,
    count: u64,
    mut pacer: Pacer,
    queue: mpsc::Sender<Dispatch>,
) -> u64 {
    let mut dispatched: u64 = 0;
    for seq in 1..=count {
        if pacer.tick().await.is_none() {
            debug!(
                "[{}] dispatch cancelled after {} of {}",
                job.name, dispatched, count
            );
            break;
        }
        let unit = Dispatch {
            seq,
            job: Arc::clone(&job),
        };
        if queue.send(unit).await.is_err() {
            warn!("[{}] dispatch queue closed early", job.name);
            break;
        }
        dispatched = seq;
    }
    dispatched
}
