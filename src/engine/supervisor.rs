use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::ScenarioError;
use crate::scenario::Scenario;

use super::{EngineConfig, ScenarioReport, run_scenario};

/// Final result per scenario name: a report, or the reason the scenario
/// could not run.
pub type RunReports = BTreeMap<String, Result<ScenarioReport, ScenarioError>>;

type SharedReports = Arc<Mutex<RunReports>>;

/// Runs every scenario concurrently and waits for all of them.
///
/// Each scenario gets its own pacer, transport and workers; a failing
/// scenario does not affect its siblings. A repeated name is reported as a
/// [`ScenarioError::DuplicateName`] under the first free `name#n`, so it
/// never shadows a configured scenario.
pub async fn run_scenarios(
    scenarios: Vec<Scenario>,
    config: &EngineConfig,
    cancel: &CancellationToken,
) -> RunReports {
    let reports: SharedReports = Arc::new(Mutex::new(BTreeMap::new()));
    let mut taken: HashSet<String> = scenarios
        .iter()
        .map(|scenario| scenario.name.clone())
        .collect();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut tasks: Vec<(String, JoinHandle<()>)> = Vec::with_capacity(scenarios.len());

    for scenario in scenarios {
        let occurrences = seen.entry(scenario.name.clone()).or_insert(0);
        *occurrences = occurrences.saturating_add(1);
        if *occurrences > 1 {
            let key = duplicate_key(&scenario.name, *occurrences, &mut taken);
            error!("[{}] duplicate scenario name, skipping", key);
            insert_report(
                &reports,
                key,
                Err(ScenarioError::DuplicateName {
                    name: scenario.name,
                }),
            );
            continue;
        }

        let name = scenario.name.clone();
        let config = *config;
        let cancel = cancel.clone();
        let reports = Arc::clone(&reports);
        let handle = tokio::spawn(async move {
            info!("{} scenario start", scenario.name);
            let result = run_scenario(&scenario, &config, &cancel).await;
            match &result {
                Ok(report) => info!(
                    "{} scenario finished ({} requests)",
                    scenario.name,
                    report.total()
                ),
                Err(err) => error!("{} scenario failed: {}", scenario.name, err),
            }
            insert_report(&reports, scenario.name, result);
        });
        tasks.push((name, handle));
    }

    info!("Running");
    for (name, handle) in tasks {
        if let Err(source) = handle.await {
            error!("{} scenario task failed: {}", name, source);
            insert_report(&reports, name, Err(ScenarioError::TaskFailed { source }));
        }
    }

    let mut guard = reports.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::take(&mut *guard)
}

/// First unused `name#n` with `n >= from`. The key is reserved in `taken`.
fn duplicate_key(name: &str, from: usize, taken: &mut HashSet<String>) -> String {
    let mut suffix = from;
    loop {
        let key = format!("{}#{}", name, suffix);
        if taken.insert(key.clone()) {
            return key;
        }
        suffix = suffix.saturating_add(1);
    }
}

fn insert_report(
    reports: &SharedReports,
    name: String,
    result: Result<ScenarioReport, ScenarioError>,
) {
    reports
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name, result);
}
