use thiserror::Error;

/// Failures that escape an aggregation. Upstream outages never end up here.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("weather task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
