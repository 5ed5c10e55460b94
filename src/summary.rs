//! Final run summary rendering.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::{RunReports, ScenarioReport};

/// One line per scenario, in name order.
#[must_use]
pub fn summary_lines(reports: &RunReports) -> Vec<String> {
    reports
        .iter()
        .map(|(name, result)| match result {
            Ok(report) => format!(
                "finished|[{}]\tsuccess: {}, validation fail: {}, request fail: {}",
                name, report.success, report.validation_failed, report.request_failed
            ),
            Err(err) => format!("failed|[{}]\t{}", name, err),
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum JsonEntry<'a> {
    Report(&'a ScenarioReport),
    Error { error: String },
}

/// JSON object keyed by scenario name.
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn summary_json(reports: &RunReports) -> Result<String, serde_json::Error> {
    let entries: BTreeMap<&str, JsonEntry<'_>> = reports
        .iter()
        .map(|(name, result)| {
            let entry = match result {
                Ok(report) => JsonEntry::Report(report),
                Err(err) => JsonEntry::Error {
                    error: err.to_string(),
                },
            };
            (name.as_str(), entry)
        })
        .collect();
    serde_json::to_string(&entries)
}
