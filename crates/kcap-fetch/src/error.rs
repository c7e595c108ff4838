//! Error types for kcap-fetch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid target '{0}': expected ALIAS/BUCKET/PREFIX")]
    InvalidTarget(String),

    #[error("invalid source url '{0}'")]
    InvalidUrl(String),

    #[error("unable to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[cfg(feature = "reqwest")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed capture framing: {0}")]
    Framing(String),

    #[error("failed to read capture stream: {0}")]
    Read(#[source] io::Error),
}

/// Fatal failures of the tee pipeline. Validation problems are not errors here;
/// they are carried in [`crate::TeeReport::validation`].
#[derive(Debug, Error)]
pub enum TeeError {
    #[error("failed to read capture stream: {0}")]
    Source(#[source] io::Error),

    #[error("failed to write temporary file: {0}")]
    Write(#[source] io::Error),
}

impl TeeError {
    /// A copy of the underlying error for the validator side of the pipe.
    pub(crate) fn to_pipe_error(&self) -> io::Error {
        let (Self::Source(err) | Self::Write(err)) = self;
        io::Error::new(err.kind(), err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
