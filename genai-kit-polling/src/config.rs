//! Poll configuration.

use std::time::Duration;

/// Interval used while waiting on video generation.
pub const VIDEO_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Interval used while waiting on uploaded file processing.
pub const FILE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration for a poll loop.
///
/// The default polls every five seconds with no attempt bound and no
/// timeout. The presets add bounds so a job that never settles cannot keep a
/// caller waiting indefinitely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Wait between a pending observation and the next refresh.
    pub interval: Duration,
    /// Maximum number of refreshes.
    pub max_attempts: Option<u32>,
    /// Maximum total time spent waiting.
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: FILE_POLL_INTERVAL,
            max_attempts: None,
            timeout: None,
        }
    }
}

impl PollConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the poll interval.
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Bound the number of refreshes.
    #[must_use]
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n);
        self
    }

    /// Bound the total waiting time.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Remove both bounds.
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.max_attempts = None;
        self.timeout = None;
        self
    }

    /// Config for video generation jobs: 10s interval, 30 minute timeout.
    pub fn video() -> Self {
        Self::new()
            .interval(VIDEO_POLL_INTERVAL)
            .timeout(Duration::from_secs(30 * 60))
    }

    /// Config for file processing: 5s interval, 10 minute timeout.
    pub fn file_processing() -> Self {
        Self::new()
            .interval(FILE_POLL_INTERVAL)
            .timeout(Duration::from_secs(10 * 60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        let config = PollConfig::default();
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.max_attempts, None);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_presets() {
        assert_eq!(PollConfig::video().interval, Duration::from_secs(10));
        assert_eq!(PollConfig::file_processing().interval, Duration::from_secs(5));
        assert!(PollConfig::video().timeout.is_some());
        assert_eq!(PollConfig::video().unbounded().timeout, None);
    }

    #[test]
    fn test_builder() {
        let config = PollConfig::new()
            .interval(Duration::from_millis(250))
            .max_attempts(4)
            .timeout(Duration::from_secs(3));
        assert_eq!(config.interval, Duration::from_millis(250));
        assert_eq!(config.max_attempts, Some(4));
        assert_eq!(config.timeout, Some(Duration::from_secs(3)));
    }
}
