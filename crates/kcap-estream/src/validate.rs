use std::io::{self, Read};

use tracing::{debug, warn};

use crate::reader::{Reader, Version};
use crate::{FormatError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub name:      String,
    pub encrypted: bool,
    /// Payload bytes skipped.
    pub bytes:     u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerReport {
    pub version:        Version,
    pub key_blocks:     usize,
    pub streams:        Vec<StreamSummary>,
    /// Bytes found after the end-of-file marker.
    pub trailing_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The input is a well-formed container.
    Valid(ContainerReport),
    /// The input is not a container; everything after the header probe was discarded.
    Unrecognized { drained: u64 },
}

impl Outcome {
    pub fn is_valid(&self) -> bool { matches!(self, Self::Valid(_)) }
}

/// Walk a container structurally, skipping every sub-stream payload.
///
/// Input that does not start with a container header is drained and reported
/// as [`Outcome::Unrecognized`] rather than as an error. The input is fully
/// consumed on every return path unless reading it fails.
pub fn validate<R: Read>(mut input: R) -> Result<Outcome> {
    let walked = match Reader::new(&mut input) {
        Ok(mut reader) => walk(&mut reader),
        Err(err) => {
            debug!(%err, "input is not a container; draining");
            let drained = drain(&mut input)?;
            return Ok(Outcome::Unrecognized { drained });
        }
    };

    match walked {
        Ok(mut report) => {
            report.trailing_bytes = drain(&mut input)?;
            if report.trailing_bytes > 0 {
                warn!(bytes = report.trailing_bytes, "data after end-of-file marker");
            }
            Ok(Outcome::Valid(report))
        }
        Err(err) => {
            if !matches!(err, FormatError::Io(_)) {
                if let Err(drain_err) = drain(&mut input) {
                    debug!(%drain_err, "draining after structural error failed");
                }
            }
            Err(err)
        }
    }
}

fn walk<R: Read>(reader: &mut Reader<R>) -> Result<ContainerReport> {
    let mut streams = Vec::new();
    while let Some(stream) = reader.next_stream()? {
        let name = stream.name().to_owned();
        let encrypted = stream.is_encrypted();
        let bytes = stream.skip()?;
        debug!(%name, encrypted, bytes, "skipped sub-stream");
        streams.push(StreamSummary {
            name,
            encrypted,
            bytes,
        });
    }

    Ok(ContainerReport {
        version: reader.version(),
        key_blocks: reader.key_blocks(),
        streams,
        trailing_bytes: 0,
    })
}

fn drain<R: Read>(input: &mut R) -> io::Result<u64> { io::copy(input, &mut io::sink()) }
