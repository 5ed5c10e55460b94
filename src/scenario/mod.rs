//! Scenario descriptions and their resolution into runnable plans.
//!
//! A [`Scenario`] is what the configuration file describes: a named target,
//! a pace, the response rules and optional keep-alive overrides. Before a
//! scenario runs it is resolved into a [`ScenarioPlan`], which is where
//! configuration mistakes surface as [`ScenarioError`]s.
mod plan;


use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use plan::ScenarioPlan;

use crate::error::ScenarioError;

/// Default interval after which a keep-alive connection pool is replaced.
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(10);
/// Default idle timeout applied to pooled connections.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub count: Option<u64>,
    /// Run length in seconds; combined with `throughput` to derive the count.
    #[serde(default)]
    pub period: Option<u64>,
    /// Requests per second.
    #[serde(default)]
    pub throughput: f64,
    #[serde(default, alias = "validate")]
    pub validates: Vec<Validate>,
    #[serde(default, alias = "disableKeepalive")]
    pub disable_keepalive: Option<bool>,
    /// Seconds a pool is reused before it gets rotated.
    #[serde(default, alias = "keepaliveSeconds")]
    pub keepalive: Option<u64>,
    #[serde(default, alias = "idleTimeoutSeconds")]
    pub idle_timeout: Option<u64>,
}

/// A named response assertion. Each set field is one check; unset fields are
/// skipped.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Validate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "statusCode")]
    pub status_code: Option<u16>,
}

impl Validate {
    #[must_use]
    pub fn status_code(expected: u16) -> Self {
        Self {
            name: Some(format!("status_code={}", expected)),
            status_code: Some(expected),
        }
    }

    /// Name used when reporting a failed check.
    #[must_use]
    pub fn label(&self, kind: &str) -> String {
        self.name.clone().unwrap_or_else(|| kind.to_owned())
    }
}

/// Connection reuse policy for one scenario's transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlivePolicy {
    pub disable_keepalive: bool,
    pub refresh_interval: Duration,
    pub idle_timeout: Duration,
}

impl Default for KeepAlivePolicy {
    fn default() -> Self {
        Self {
            disable_keepalive: false,
            refresh_interval: DEFAULT_KEEPALIVE,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl From<&Scenario> for KeepAlivePolicy {
    fn from(scenario: &Scenario) -> Self {
        let defaults = Self::default();
        Self {
            disable_keepalive: scenario
                .disable_keepalive
                .unwrap_or(defaults.disable_keepalive),
            refresh_interval: scenario
                .keepalive
                .map_or(defaults.refresh_interval, Duration::from_secs),
            idle_timeout: scenario
                .idle_timeout
                .map_or(defaults.idle_timeout, Duration::from_secs),
        }
    }
}

impl Scenario {
    /// Resolves the scenario into a runnable plan.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is invalid, the throughput is not
    /// positive, or the timing is missing or ambiguous.
    pub fn plan(&self) -> Result<ScenarioPlan, ScenarioError> {
        ScenarioPlan::resolve(self)
    }

    #[must_use]
    pub fn keepalive_policy(&self) -> KeepAlivePolicy {
        KeepAlivePolicy::from(self)
    }
}
