//! # genai-kit-polling
//!
//! Fixed-interval polling for long-running remote jobs such as video
//! generation and uploaded-file processing.
//!
//! ## Core Concepts
//!
//! - **[`PollConfig`]**: interval plus optional attempt and time bounds
//! - **[`PollState`]** / **[`Pollable`]**: how a handle reports pending, done
//!   or failed
//! - **[`Poller`]**: the loop, with optional cancellation
//! - **[`PollError`]**: why a loop ended without a result; converts into
//!   [`genai_kit_core::GenAiError`]
//!
//! ## Example
//!
//! ```ignore
//! use genai_kit_polling::{poll_until_done, PollConfig};
//!
//! let file = client.upload_file(upload).await?;
//! let ready = poll_until_done(&PollConfig::file_processing(), file, |f| async move {
//!     client.get_file(&f.name).await
//! })
//! .await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod poller;

pub use config::{PollConfig, FILE_POLL_INTERVAL, VIDEO_POLL_INTERVAL};
pub use error::{PollError, PollResult};
pub use poller::{poll_until_done, PollState, PollStats, Pollable, Poller};
pub use tokio_util::sync::CancellationToken;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        poll_until_done, CancellationToken, PollConfig, PollError, PollState, Pollable, Poller,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let poller = Poller::new(PollConfig::new().max_attempts(5));
        assert_eq!(poller.config().max_attempts, Some(5));
    }

    #[test]
    fn test_interval_constants() {
        assert_eq!(VIDEO_POLL_INTERVAL, Duration::from_secs(10));
        assert_eq!(FILE_POLL_INTERVAL, Duration::from_secs(5));
    }
}
