use url::Url;

use crate::error::ScenarioError;

use super::{KeepAlivePolicy, Scenario};

/// Products closer than this to a whole number are treated as that number,
/// so `0.1/s` for `30s` yields 3 requests rather than 4.
const COUNT_ROUNDING_TOLERANCE: f64 = 1e-9;

/// Largest request count representable without precision loss in an `f64`.
const MAX_DERIVED_COUNT: f64 = 9_007_199_254_740_992.0;

/// A validated scenario, ready to be dispatched.
#[derive(Debug, Clone)]
pub struct ScenarioPlan {
    pub url: Url,
    pub count: u64,
    pub throughput: f64,
    pub keepalive: KeepAlivePolicy,
}

impl ScenarioPlan {
    pub(super) fn resolve(scenario: &Scenario) -> Result<Self, ScenarioError> {
        let url = parse_url(&scenario.url)?;
        let throughput = scenario.throughput;
        if !throughput.is_finite() || throughput <= 0.0 {
            return Err(ScenarioError::ThroughputNotPositive { value: throughput });
        }
        let count = match (scenario.count, scenario.period) {
            (Some(_), Some(_)) => return Err(ScenarioError::CountAndPeriod),
            (None, None) => return Err(ScenarioError::MissingCountOrPeriod),
            (Some(count), None) => count,
            (None, Some(period)) => count_for_period(period, throughput)?,
        };

        Ok(Self {
            url,
            count,
            throughput,
            keepalive: KeepAlivePolicy::from(scenario),
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, ScenarioError> {
    let url = Url::parse(raw).map_err(|source| ScenarioError::InvalidUrl {
        url: raw.to_owned(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ScenarioError::UnsupportedScheme {
            url: raw.to_owned(),
            scheme: scheme.to_owned(),
        }),
    }
}

/// `ceil(period * throughput)`, tolerant of float noise around whole numbers.
pub(crate) fn count_for_period(period: u64, throughput: f64) -> Result<u64, ScenarioError> {
    let raw = period as f64 * throughput;
    let rounded = raw.round();
    let count = if (raw - rounded).abs() < COUNT_ROUNDING_TOLERANCE {
        rounded
    } else {
        raw.ceil()
    };
    if !count.is_finite() || count > MAX_DERIVED_COUNT {
        return Err(ScenarioError::CountOverflow { period, throughput });
    }
    Ok(count as u64)
}
