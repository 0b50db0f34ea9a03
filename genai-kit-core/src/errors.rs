//! Error types for genai-kit.
//!
//! Every externally-facing operation fails with exactly one of three kinds:
//!
//! - [`ValidationError`]: caller input was missing or malformed. Raised before
//!   any remote call is made.
//! - [`ApiError`]: the remote service failed or returned a shape that cannot
//!   be used. The low-level failure is kept as the error source.
//! - [`ProcessingFailedError`]: a polled job (file processing, video
//!   generation) reached a failed terminal state.

use std::error::Error as StdError;
use thiserror::Error;

/// Boxed, thread-safe error used as a chained cause.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The main error type for genai-kit operations.
#[derive(Error, Debug)]
pub enum GenAiError {
    /// Caller input was rejected before any remote call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The remote API failed or returned an unusable response.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A long-running job ended in a failed state.
    #[error(transparent)]
    ProcessingFailed(#[from] ProcessingFailedError),
}

/// Result type alias using [`GenAiError`].
pub type Result<T> = std::result::Result<T, GenAiError>;

impl GenAiError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(message))
    }

    /// Create an API error without a cause.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api(ApiError::new(message))
    }

    /// Create an API error wrapping a lower-level cause.
    pub fn api_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Api(ApiError::with_source(message, source))
    }

    /// Create a processing failure without a cause.
    pub fn processing_failed(message: impl Into<String>) -> Self {
        Self::ProcessingFailed(ProcessingFailedError::new(message))
    }

    /// Create a processing failure wrapping a lower-level cause.
    pub fn processing_failed_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::ProcessingFailed(ProcessingFailedError::with_source(message, source))
    }

    /// Check if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an API error.
    #[must_use]
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    /// Check if this is a processing failure.
    #[must_use]
    pub fn is_processing_failed(&self) -> bool {
        matches!(self, Self::ProcessingFailed(_))
    }

    /// The human-readable message of the error.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(e) => &e.message,
            Self::Api(e) => &e.message,
            Self::ProcessingFailed(e) => &e.message,
        }
    }
}

/// Caller-supplied parameters were missing or malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Error message.
    pub message: String,
    /// Names of the parameters that failed validation.
    pub fields: Vec<String>,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Create an error listing missing parameters.
    pub fn missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        Self {
            message: format!("Missing required parameters: {}", fields.join(", ")),
            fields,
        }
    }
}

/// The remote service failed or returned an unusable response.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ApiError {
    /// Error message.
    pub message: String,
    /// Underlying cause.
    #[source]
    pub source: Option<BoxError>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an API error with a chained cause.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// A polled job reached a failed terminal state.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ProcessingFailedError {
    /// Error message.
    pub message: String,
    /// Underlying cause.
    #[source]
    pub source: Option<BoxError>,
}

impl ProcessingFailedError {
    /// Create a new processing failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a processing failure with a chained cause.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Extension for turning low-level failures into [`GenAiError::Api`].
pub trait ResultExt<T> {
    /// Wrap the error as an [`ApiError`] with `message`, chaining the original.
    fn api_context(self, message: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn api_context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| GenAiError::api_with_source(message, e))
    }
}

/// Fail with a [`ValidationError`] naming every blank parameter.
///
/// A parameter is blank when it is empty or whitespace only.
///
/// ```rust
/// use genai_kit_core::errors::require_params;
///
/// assert!(require_params(&[("model", "gemini-2.0-flash"), ("prompt", "hi")]).is_ok());
/// let err = require_params(&[("model", ""), ("prompt", " ")]).unwrap_err();
/// assert!(err.is_validation());
/// ```
pub fn require_params(params: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<&str> = params
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::missing(missing).into())
    }
}

/// Fail with a [`ValidationError`] if `items` is empty.
pub fn require_non_empty<T>(name: &str, items: &[T]) -> Result<()> {
    if items.is_empty() {
        Err(ValidationError {
            message: format!("{name} must not be empty"),
            fields: vec![name.to_string()],
        }
        .into())
    } else {
        Ok(())
    }
}
