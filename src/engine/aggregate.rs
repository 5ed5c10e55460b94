use futures_util::stream::{self, Stream, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;

/// Classified result of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ValidationFailed,
    RequestFailed,
}

/// Outcome counts for one scenario run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub success: u64,
    pub validation_failed: u64,
    pub request_failed: u64,
}

impl ScenarioReport {
    pub fn record(&mut self, outcome: Outcome) {
        let slot = match outcome {
            Outcome::Success => &mut self.success,
            Outcome::ValidationFailed => &mut self.validation_failed,
            Outcome::RequestFailed => &mut self.request_failed,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.success
            .saturating_add(self.validation_failed)
            .saturating_add(self.request_failed)
    }
}

/// Fans the per-worker outcome channels into one stream. The merged stream
/// ends only after every worker has closed its channel.
pub(crate) fn merge(
    channels: Vec<mpsc::Receiver<Outcome>>,
) -> impl Stream<Item = Outcome> + Unpin {
    stream::select_all(channels.into_iter().map(|receiver| {
        Box::pin(stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|outcome| (outcome, receiver))
        }))
    }))
}

pub(crate) async fn tally<S>(mut outcomes: S) -> ScenarioReport
where
    S: Stream<Item = Outcome> + Unpin,
{
    let mut report = ScenarioReport::default();
    while let Some(outcome) = outcomes.next().await {
        report.record(outcome);
    }
    report
}
