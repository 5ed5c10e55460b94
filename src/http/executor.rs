use std::time::Duration;

use futures_util::StreamExt;
use url::Url;

use crate::error::HttpError;

use super::transport::TransportManager;

/// What the validator gets to see of a finished request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedResponse {
    pub status: u16,
    pub body_bytes: u64,
}

/// Issues single GET requests through a scenario's transport.
///
/// Each request runs under its own timeout. It is not tied to the run's
/// cancellation, so a request that has started always finishes or times out.
pub struct RequestExecutor {
    transport: TransportManager,
    timeout: Duration,
}

impl RequestExecutor {
    #[must_use]
    pub const fn new(transport: TransportManager, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Performs one GET against `url` and drains the response body.
    ///
    /// # Errors
    ///
    /// Returns an error when no client is available, the request fails or
    /// times out, or the body cannot be read.
    pub async fn execute(&self, url: &Url) -> Result<CompletedResponse, HttpError> {
        let pool = self.transport.acquire()?;
        let response = pool
            .client()
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify_send_error)?;
        let status = response.status().as_u16();
        let body_bytes = drain_response_body(response)
            .await
            .map_err(classify_body_error)?;
        Ok(CompletedResponse { status, body_bytes })
    }
}

fn classify_send_error(source: reqwest::Error) -> HttpError {
    if source.is_timeout() {
        HttpError::Timeout { source }
    } else {
        HttpError::RequestFailed { source }
    }
}

fn classify_body_error(source: reqwest::Error) -> HttpError {
    if source.is_timeout() {
        HttpError::Timeout { source }
    } else {
        HttpError::ReadBody { source }
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
