//! Poll error types.

use genai_kit_core::GenAiError;
use std::time::Duration;
use thiserror::Error;

/// Reasons a poll loop ended without a usable handle.
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// The refresh call failed. Not retried.
    #[error("refresh failed: {0}")]
    Refresh(#[source] E),

    /// The job reached a failed terminal state.
    #[error("{reason}")]
    Failed {
        /// Failure reason reported by the job.
        reason: String,
    },

    /// The attempt bound was reached while the job was still pending.
    #[error("job still pending after {attempts} refreshes")]
    AttemptsExhausted {
        /// Refreshes performed.
        attempts: u32,
    },

    /// The timeout elapsed while the job was still pending.
    #[error("job still pending after {elapsed:?}")]
    Timeout {
        /// Time spent waiting.
        elapsed: Duration,
    },

    /// The cancellation token fired.
    #[error("polling cancelled")]
    Cancelled,
}

impl<E> PollError<E> {
    /// Create a failed-state error.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Whether the job itself reported failure.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Whether a poll bound stopped the loop.
    #[must_use]
    pub fn is_bound_exceeded(&self) -> bool {
        matches!(self, Self::AttemptsExhausted { .. } | Self::Timeout { .. })
    }
}

/// Refresh failures are remote API failures; every other outcome means the
/// job did not produce a result.
impl<E> From<PollError<E>> for GenAiError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: PollError<E>) -> Self {
        match err {
            PollError::Refresh(source) => {
                GenAiError::api_with_source("Failed to refresh job status", source)
            }
            PollError::Failed { reason } => GenAiError::processing_failed(reason),
            other => {
                let message = other.to_string();
                GenAiError::processing_failed_with_source(message, other)
            }
        }
    }
}

/// Result type for poll operations.
pub type PollResult<T, E> = Result<T, PollError<E>>;
