use thiserror::Error;

/// Configuration problems detected when a scenario starts. They abort only
/// the scenario they belong to.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme '{scheme}' in '{url}'. Use http or https.")]
    UnsupportedScheme { url: String, scheme: String },
    #[error("Throughput must be a finite number > 0, got {value}.")]
    ThroughputNotPositive { value: f64 },
    #[error("Scenario cannot set both 'count' and 'period'.")]
    CountAndPeriod,
    #[error("Scenario must set either 'count' or 'period'.")]
    MissingCountOrPeriod,
    #[error("Request count for period {period}s at {throughput}/s is too large.")]
    CountOverflow { period: u64, throughput: f64 },
    #[error("Scenario name '{name}' is already used by another scenario.")]
    DuplicateName { name: String },
    #[error("Scenario task failed: {source}")]
    TaskFailed {
        #[source]
        source: tokio::task::JoinError,
    },
}
