use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::http::{RequestExecutor, validate};
use crate::scenario::Validate;

use super::aggregate::Outcome;

/// Each worker hands over one outcome at a time.
const OUTCOME_BUFFER: usize = 1;

type DispatchQueue = Arc<Mutex<mpsc::Receiver<Dispatch>>>;

/// Everything a worker needs to run one request of a scenario.
pub(crate) struct ScenarioJob {
    pub(crate) name: String,
    pub(crate) url: Url,
    pub(crate) validates: Vec<Validate>,
    pub(crate) executor: RequestExecutor,
}

impl ScenarioJob {
    /// Executes, validates and classifies one request.
    pub(crate) async fn run(&self, seq: u64) -> Outcome {
        let response = match self.executor.execute(&self.url).await {
            Ok(response) => response,
            Err(err) => {
                debug!("[{}] #{} Error: {}", self.name, seq, err);
                return Outcome::RequestFailed;
            }
        };
        if let Err(err) = validate(&self.validates, &response) {
            debug!("[{}] #{} error: {}", self.name, seq, err);
            return Outcome::ValidationFailed;
        }
        debug!("[{}] #{} Success", self.name, seq);
        Outcome::Success
    }
}

/// One unit of work on the dispatch queue.
pub(crate) struct Dispatch {
    pub(crate) seq: u64,
    pub(crate) job: Arc<ScenarioJob>,
}

/// Fixed set of workers sharing one dispatch queue, each with its own
/// outcome channel.
pub(crate) struct WorkerPool {
    pub(crate) handles: Vec<JoinHandle<u64>>,
    pub(crate) outcomes: Vec<mpsc::Receiver<Outcome>>,
}

impl WorkerPool {
    pub(crate) fn spawn(workers: usize, queue: mpsc::Receiver<Dispatch>) -> Self {
        let queue: DispatchQueue = Arc::new(Mutex::new(queue));
        let mut handles = Vec::with_capacity(workers);
        let mut outcomes = Vec::with_capacity(workers);

        for _ in 0..workers {
            let (outcome_tx, outcome_rx) = mpsc::channel(OUTCOME_BUFFER);
            handles.push(tokio::spawn(run_worker(Arc::clone(&queue), outcome_tx)));
            outcomes.push(outcome_rx);
        }

        Self { handles, outcomes }
    }
}

/// Takes dispatches until the queue is closed and drained. Returns how many
/// dispatches this worker handled.
async fn run_worker(queue: DispatchQueue, outcome_tx: mpsc::Sender<Outcome>) -> u64 {
    let mut handled: u64 = 0;
    loop {
        let next = { queue.lock().await.recv().await };
        let Some(dispatch) = next else {
            break;
        };
        let outcome = dispatch.job.run(dispatch.seq).await;
        handled = handled.saturating_add(1);
        if outcome_tx.send(outcome).await.is_err() {
            warn!(
                "[{}] outcome receiver closed, dropping dispatch #{}",
                dispatch.job.name, dispatch.seq
            );
            break;
        }
    }
    handled
}
