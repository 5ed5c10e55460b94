//! Per-scenario execution engine.
//!
//! A scenario run wires a [`pacer::Pacer`] into the dispatcher, which feeds a
//! bounded queue drained by a fixed pool of workers. Each worker runs the
//! request executor and validator and emits one [`Outcome`] per dispatch;
//! the outcome channels are merged and tallied into a [`ScenarioReport`].
//!
//! Cancellation only stops dispatching. Requests already handed to a worker
//! run to completion under their own timeout and are still counted.
mod aggregate;
mod dispatcher;
mod pacer;
mod supervisor;
mod worker;

#[cfg(test)]
mod tests;

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use aggregate::{Outcome, ScenarioReport};
pub use supervisor::{RunReports, run_scenarios};

use crate::error::ScenarioError;
use crate::http::{DEFAULT_REQUEST_TIMEOUT, RequestExecutor, TransportManager};
use crate::scenario::Scenario;

use worker::{ScenarioJob, WorkerPool};

/// Default number of workers per scenario.
pub const DEFAULT_WORKERS: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(workers) => workers,
    None => NonZeroUsize::MIN,
};

/// Settings shared by every scenario of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Concurrent workers per scenario; also the dispatch queue capacity.
    pub workers: NonZeroUsize,
    /// Timeout applied to each request on its own.
    pub request_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPhase {
    Dispatching,
    Draining,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Dispatching => "dispatching",
            Self::Draining => "draining",
            Self::Done => "done",
        };
        f.write_str(label)
    }
}

/// Runs one scenario to completion or until `cancel` fires.
///
/// # Errors
///
/// Returns an error when the scenario is misconfigured. Request and
/// validation failures are counted in the report instead.
pub async fn run_scenario(
    scenario: &Scenario,
    config: &EngineConfig,
    cancel: &CancellationToken,
) -> Result<ScenarioReport, ScenarioError> {
    let plan = scenario.plan()?;
    if plan.count == 0 {
        info!("[{}] nothing to dispatch", scenario.name);
        return Ok(ScenarioReport::default());
    }

    let workers = usize::try_from(plan.count)
        .map_or(config.workers.get(), |count| count.min(config.workers.get()));
    let executor = RequestExecutor::new(
        TransportManager::new(&scenario.name, plan.keepalive),
        config.request_timeout,
    );
    let job = Arc::new(ScenarioJob {
        name: scenario.name.clone(),
        url: plan.url,
        validates: scenario.validates.clone(),
        executor,
    });

    debug!(
        "[{}] {} ({} requests at {}/s, {} workers)",
        scenario.name,
        RunPhase::Dispatching,
        plan.count,
        plan.throughput,
        workers
    );
    let (queue_tx, queue_rx) = mpsc::channel(workers);
    let pool = WorkerPool::spawn(workers, queue_rx);
    let pacer = pacer::Pacer::spawn(plan.throughput, cancel);
    let dispatcher = tokio::spawn(dispatcher::dispatch(
        Arc::clone(&job),
        plan.count,
        pacer,
        queue_tx,
    ));

    let report = aggregate::tally(aggregate::merge(pool.outcomes)).await;

    match dispatcher.await {
        Ok(dispatched) => debug!(
            "[{}] {} after {} dispatches",
            scenario.name,
            RunPhase::Draining,
            dispatched
        ),
        Err(err) => warn!("[{}] dispatcher task failed: {}", scenario.name, err),
    }
    for handle in pool.handles {
        if let Err(err) = handle.await {
            warn!("[{}] worker task failed: {}", scenario.name, err);
        }
    }
    debug!("[{}] {}", scenario.name, RunPhase::Done);

    Ok(report)
}
