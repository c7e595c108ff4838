//! Capture retrieval for kcap.
//!
//! [`CaptureSource`] opens a capture for a [`Target`]; [`tee_validate`] then
//! copies the body to disk while a blocking task checks its container
//! structure. [`ProgressStream`] can wrap the body to drive a progress bar.

mod error;
mod pipe;
pub mod progress;
pub mod source;
mod tee;

pub use error::{Result, SourceError, TeeError};
pub use pipe::{PipeReader, PipeWriter, pipe};
pub use progress::{ClampedCounter, ProgressStream, Tracker};
pub use source::{AnySource, BoxStream, Capture, CaptureSource, FileSource, Target, unframe};
#[cfg(feature = "reqwest")]
pub use source::HttpSource;
pub use tee::{TeeReport, tee_validate};
