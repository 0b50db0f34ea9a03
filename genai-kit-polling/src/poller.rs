//! Poll loop for long-running remote jobs.
//!
//! One loop serves every job kind: the caller supplies how to read the
//! terminal state of a handle and how to refresh it. Each iteration performs
//! exactly one timed suspension followed by exactly one refresh. Refresh
//! failures end the loop at once.

use crate::config::PollConfig;
use crate::error::{PollError, PollResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Observed state of a job handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// Still running.
    Pending,
    /// Finished successfully.
    Done,
    /// Finished with a failure.
    Failed(String),
}

impl PollState {
    /// Whether the job has reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A handle that can report its own [`PollState`].
pub trait Pollable {
    /// Current state of the job behind this handle.
    fn poll_state(&self) -> PollState;
}

/// Counters from a completed poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Refresh calls made.
    pub refreshes: u32,
    /// Total time spent suspended.
    pub waited: Duration,
}

/// Drives a job handle to a terminal state.
///
/// # Example
///
/// ```ignore
/// use genai_kit_polling::{Poller, PollConfig};
///
/// let poller = Poller::new(PollConfig::video());
/// let finished = poller
///     .run(operation, |op| async move { client.get_operation(&op.name).await })
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Poller {
    config: PollConfig,
    cancel: Option<CancellationToken>,
}

impl Poller {
    /// Create a poller with `config`.
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Abort the wait when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll a [`Pollable`] handle until it is terminal.
    pub async fn run<H, F, Fut, E>(&self, handle: H, refresh: F) -> PollResult<H, E>
    where
        H: Pollable,
        F: FnMut(H) -> Fut,
        Fut: Future<Output = Result<H, E>>,
    {
        self.run_with(handle, H::poll_state, refresh).await
    }

    /// Poll with an explicit terminal-state interpretation.
    pub async fn run_with<H, S, F, Fut, E>(
        &self,
        handle: H,
        state: S,
        refresh: F,
    ) -> PollResult<H, E>
    where
        S: Fn(&H) -> PollState,
        F: FnMut(H) -> Fut,
        Fut: Future<Output = Result<H, E>>,
    {
        self.run_with_stats(handle, state, refresh)
            .await
            .map(|(handle, _)| handle)
    }

    /// Poll with an explicit interpretation and report counters.
    pub async fn run_with_stats<H, S, F, Fut, E>(
        &self,
        mut handle: H,
        state: S,
        mut refresh: F,
    ) -> PollResult<(H, PollStats), E>
    where
        S: Fn(&H) -> PollState,
        F: FnMut(H) -> Fut,
        Fut: Future<Output = Result<H, E>>,
    {
        let started = Instant::now();
        let mut stats = PollStats::default();

        loop {
            match state(&handle) {
                PollState::Done => {
                    debug!(
                        refreshes = stats.refreshes,
                        waited_ms = stats.waited.as_millis(),
                        "Job finished"
                    );
                    return Ok((handle, stats));
                }
                PollState::Failed(reason) => {
                    warn!(refreshes = stats.refreshes, reason = %reason, "Job failed");
                    return Err(PollError::Failed { reason });
                }
                PollState::Pending => {}
            }

            if let Some(max) = self.config.max_attempts {
                if stats.refreshes >= max {
                    warn!(attempts = stats.refreshes, "Poll attempts exhausted");
                    return Err(PollError::AttemptsExhausted {
                        attempts: stats.refreshes,
                    });
                }
            }

            let wait = match self.config.timeout {
                Some(timeout) => {
                    let elapsed = started.elapsed();
                    if elapsed >= timeout {
                        warn!(elapsed_ms = elapsed.as_millis(), "Poll timed out");
                        return Err(PollError::Timeout { elapsed });
                    }
                    self.config.interval.min(timeout - elapsed)
                }
                None => self.config.interval,
            };

            debug!(
                attempt = stats.refreshes + 1,
                wait_ms = wait.as_millis(),
                "Job pending, waiting before refresh"
            );

            match &self.cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            debug!(refreshes = stats.refreshes, "Polling cancelled");
                            return Err(PollError::Cancelled);
                        }
                        _ = sleep(wait) => {}
                    }
                }
                None => sleep(wait).await,
            }
            stats.waited += wait;

            handle = refresh(handle).await.map_err(PollError::Refresh)?;
            stats.refreshes += 1;
        }
    }
}

/// Poll `handle` with `config` until it is terminal.
///
/// Shorthand for `Poller::new(config.clone()).run(handle, refresh)`.
pub async fn poll_until_done<H, F, Fut, E>(
    config: &PollConfig,
    handle: H,
    refresh: F,
) -> PollResult<H, E>
where
    H: Pollable,
    F: FnMut(H) -> Fut,
    Fut: Future<Output = Result<H, E>>,
{
    Poller::new(config.clone()).run(handle, refresh).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Debug, Clone, PartialEq)]
    struct Job {
        done: bool,
        items: Vec<&'static str>,
    }

    impl Job {
        fn pending() -> Self {
            Self {
                done: false,
                items: Vec::new(),
            }
        }
    }

    impl Pollable for Job {
        fn poll_state(&self) -> PollState {
            if self.done {
                PollState::Done
            } else {
                PollState::Pending
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum FileState {
        Processing,
        Active,
        Failed,
    }

    fn file_state(s: &FileState) -> PollState {
        match s {
            FileState::Processing => PollState::Pending,
            FileState::Failed => PollState::Failed("File processing failed.".into()),
            FileState::Active => PollState::Done,
        }
    }

    fn scripted<H>(steps: Vec<H>) -> impl FnMut(H) -> std::future::Ready<Result<H, io::Error>> {
        let mut steps = VecDeque::from(steps);
        move |_| {
            std::future::ready(
                steps
                    .pop_front()
                    .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "script exhausted")),
            )
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_refreshes_then_done() {
        let start = Instant::now();
        let poller = Poller::new(PollConfig::video().unbounded());
        let refresh = scripted(vec![
            Job::pending(),
            Job {
                done: true,
                items: vec!["a", "b"],
            },
        ]);

        let (job, stats) = assert_ok!(
            poller
                .run_with_stats(Job::pending(), Job::poll_state, refresh)
                .await
        );

        assert_eq!(job.items, vec!["a", "b"]);
        assert_eq!(stats.refreshes, 2);
        assert_eq!(stats.waited, Duration::from_secs(20));
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_handle_needs_no_refresh() {
        let mut calls = 0;
        let poller = Poller::default();
        let done = Job {
            done: true,
            items: vec!["x"],
        };

        let job = poller
            .run(done.clone(), |j| {
                calls += 1;
                std::future::ready(Ok::<_, io::Error>(j))
            })
            .await
            .unwrap();

        assert_eq!(job, done);
        assert_eq!(calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_state_stops_refreshing() {
        let mut remaining = VecDeque::from(vec![FileState::Failed, FileState::Active]);
        let mut calls = 0;
        let poller = Poller::new(PollConfig::file_processing());

        let result = poller
            .run_with(FileState::Processing, file_state, |_| {
                calls += 1;
                std::future::ready(Ok::<_, io::Error>(
                    remaining.pop_front().unwrap_or(FileState::Active),
                ))
            })
            .await;

        let err = assert_err!(result);
        assert!(err.is_failed());
        assert_eq!(err.to_string(), "File processing failed.");
        assert_eq!(calls, 1);
        assert_eq!(remaining, VecDeque::from(vec![FileState::Active]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_error_propagates_without_retry() {
        let mut calls = 0;
        let poller = Poller::default();

        let result = poller
            .run(Job::pending(), |_| {
                calls += 1;
                std::future::ready(Err::<Job, _>(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "reset",
                )))
            })
            .await;

        assert!(matches!(result, Err(PollError::Refresh(ref e)) if e.kind() == io::ErrorKind::ConnectionReset));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_bound() {
        let poller = Poller::new(PollConfig::new().max_attempts(3));
        let mut calls = 0;

        let result = poller
            .run(Job::pending(), |j| {
                calls += 1;
                std::future::ready(Ok::<_, io::Error>(j))
            })
            .await;

        assert!(matches!(result, Err(PollError::AttemptsExhausted { attempts: 3 })));
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bound_clamps_last_wait() {
        let poller = Poller::new(
            PollConfig::new()
                .interval(Duration::from_secs(10))
                .timeout(Duration::from_secs(25)),
        );
        let mut calls = 0;

        let result = poller
            .run(Job::pending(), |j| {
                calls += 1;
                std::future::ready(Ok::<_, io::Error>(j))
            })
            .await;

        match result {
            Err(PollError::Timeout { elapsed }) => assert_eq!(elapsed, Duration::from_secs(25)),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_wait() {
        let token = CancellationToken::new();
        token.cancel();
        let poller = Poller::default().with_cancellation(token);
        let mut calls = 0;

        let result = poller
            .run(Job::pending(), |j| {
                calls += 1;
                std::future::ready(Ok::<_, io::Error>(j))
            })
            .await;

        assert!(matches!(result, Err(PollError::Cancelled)));
        assert_eq!(calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_done() {
        let refresh = scripted(vec![Job {
            done: true,
            items: vec!["only"],
        }]);
        let job = poll_until_done(&PollConfig::video(), Job::pending(), refresh)
            .await
            .unwrap();
        assert_eq!(job.items, vec!["only"]);
    }

    #[test]
    fn test_poll_state_terminal() {
        assert!(!PollState::Pending.is_terminal());
        assert!(PollState::Done.is_terminal());
        assert!(PollState::Failed("x".into()).is_terminal());
    }
}
