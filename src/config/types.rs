use serde::{Deserialize, Serialize};

use crate::scenario::Scenario;

/// Top-level layout of a scenario file.
///
/// ```yaml
/// scenarios:
///   - name: ping
///     url: https://example.com
///     throughput: 1
///     period: 10
///     validates:
///       - name: status_code=200
///         status_code: 200
///     disable_keepalive: false
///     keepalive: 10
///     idle_timeout: 10
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ScenarioFile {
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}
