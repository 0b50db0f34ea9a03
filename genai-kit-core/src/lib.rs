//! # genai-kit-core
//!
//! Core types shared by the genai-kit crates:
//!
//! - **Parts**: [`Part`], [`Content`] and [`Blob`], the request/response
//!   content model of the Generative Language API
//! - **Classification**: [`classify`] splits response parts into text, code,
//!   code output, images and audio
//! - **Content building**: [`ContentBuilder`] and [`Attachment`] for
//!   multimodal prompts
//! - **Media**: MIME detection for local files
//! - **Errors**: the three-kind [`GenAiError`] taxonomy
//!
//! ## Example
//!
//! ```rust
//! use genai_kit_core::{classify, Part};
//!
//! let parts = vec![
//!     Part::text("Here is the chart"),
//!     Part::executable_code("PYTHON", "plot()"),
//!     Part::inline_data("image/png", "iVBORw0KGgo="),
//! ];
//!
//! let classified = classify(&parts);
//! assert_eq!(classified.text.len(), 1);
//! assert_eq!(classified.code.len(), 1);
//! assert_eq!(classified.images.len(), 1);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod classify;
pub mod content;
pub mod errors;
pub mod media;
pub mod parts;

pub use classify::{classify, ClassifiedParts};
pub use content::{Attachment, ContentBuilder};
pub use errors::{
    ApiError, GenAiError, ProcessingFailedError, Result, ResultExt, ValidationError,
};
pub use media::{MediaKind, INLINE_DATA_LIMIT};
pub use parts::{Blob, Content, Contents, FileData, FunctionCall, FunctionResponse, Part};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        classify, Attachment, Blob, ClassifiedParts, Content, ContentBuilder, Contents,
        GenAiError, Part, Result, ResultExt,
    };
}
