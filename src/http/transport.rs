use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use reqwest::Client;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::error::HttpError;
use crate::scenario::KeepAlivePolicy;

use super::DEFAULT_USER_AGENT;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const TCP_KEEPALIVE: Duration = Duration::from_secs(30);
const MAX_IDLE_PER_HOST: usize = 1000;
/// Extra time a retired pool is held past its idle timeout.
const RETIRE_GRACE: Duration = Duration::from_secs(1);

/// One generation of pooled connections.
///
/// Requests keep an `Arc` to the pool they started on, so a rotation never
/// interrupts them; the pool's idle connections are released once the last
/// holder lets go.
#[derive(Debug)]
pub struct ConnectionPool {
    generation: u64,
    client: Client,
}

impl ConnectionPool {
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }
}

#[derive(Default)]
struct TransportState {
    current: Option<Arc<ConnectionPool>>,
    refresh_deadline: Option<Instant>,
    generations: u64,
}

/// Owns the connection pool of a single scenario and rotates it according to
/// the scenario's keep-alive policy.
pub struct TransportManager {
    scenario: String,
    policy: KeepAlivePolicy,
    state: Mutex<TransportState>,
}

impl TransportManager {
    #[must_use]
    pub fn new(scenario: &str, policy: KeepAlivePolicy) -> Self {
        Self {
            scenario: scenario.to_owned(),
            policy,
            state: Mutex::new(TransportState::default()),
        }
    }

    /// Returns the pool to use for the next request.
    ///
    /// With keep-alive disabled the pool is built once and returned forever.
    /// Otherwise a fresh pool replaces the current one after every refresh
    /// interval and the old one is retired in the background.
    ///
    /// # Errors
    ///
    /// Returns an error when a new HTTP client cannot be built.
    pub fn acquire(&self) -> Result<Arc<ConnectionPool>, HttpError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if self.policy.disable_keepalive {
            if let Some(pool) = state.current.as_ref() {
                return Ok(Arc::clone(pool));
            }
            let pool = self.build_pool(&mut state)?;
            state.current = Some(Arc::clone(&pool));
            info!("[{}] transport generated", self.scenario);
            return Ok(pool);
        }

        let now = Instant::now();
        let expired = state.refresh_deadline.is_none_or(|deadline| now > deadline);
        if let Some(pool) = state.current.as_ref()
            && !expired
        {
            return Ok(Arc::clone(pool));
        }

        let pool = self.build_pool(&mut state)?;
        state.refresh_deadline = now.checked_add(self.policy.refresh_interval);
        if let Some(old) = state.current.replace(Arc::clone(&pool)) {
            self.retire(old);
        }
        debug!(
            "[{}] transport refreshed (generation {})",
            self.scenario, pool.generation
        );
        Ok(pool)
    }

    fn build_pool(&self, state: &mut TransportState) -> Result<Arc<ConnectionPool>, HttpError> {
        let mut builder = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .tcp_keepalive(TCP_KEEPALIVE)
            .pool_idle_timeout(Some(self.policy.idle_timeout))
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST);

        if self.policy.disable_keepalive {
            builder = builder
                .pool_max_idle_per_host(0)
                .pool_idle_timeout(Some(Duration::from_secs(0)));
        }

        let client = builder
            .build()
            .map_err(|source| HttpError::BuildClientFailed { source })?;
        state.generations = state.generations.saturating_add(1);
        Ok(Arc::new(ConnectionPool {
            generation: state.generations,
            client,
        }))
    }

    /// Holds the replaced pool until its idle connections have expired, then
    /// drops this manager's reference. In-flight requests keep their own.
    fn retire(&self, old: Arc<ConnectionPool>) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            drop(old);
            return;
        };
        let grace = self.policy.idle_timeout.saturating_add(RETIRE_GRACE);
        let scenario = self.scenario.clone();
        runtime.spawn(async move {
            sleep(grace).await;
            let generation = old.generation;
            drop(old);
            debug!(
                "[{}] idle connections closed (generation {})",
                scenario, generation
            );
        });
    }
}
