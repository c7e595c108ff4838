//! Fan one capture stream out to the temporary file and the validator.

use std::io;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use kcap_estream::{FormatError, Outcome};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::TeeError;
use crate::pipe::{PipeWriter, pipe};

#[derive(Debug)]
pub struct TeeReport {
    /// Bytes written to the file.
    pub bytes:      u64,
    /// Structural verdict. A failure here does not invalidate the download.
    pub validation: Result<Outcome, FormatError>,
}

/// Copy `body` into `file` while validating it on a blocking task.
///
/// The validator is always joined before returning. A read or write failure on
/// the copy path is returned as the error; otherwise the validator's verdict is
/// reported in [`TeeReport::validation`] and the file has been synced to disk.
pub async fn tee_validate<S>(mut body: S, file: &mut File) -> Result<TeeReport, TeeError>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    let (mut writer, reader) = pipe();
    let validator = tokio::task::spawn_blocking(move || kcap_estream::validate(reader));

    let copied = copy_to_sinks(&mut body, file, &mut writer).await;
    writer
        .close_with_error(copied.as_ref().err().map(TeeError::to_pipe_error))
        .await;
    drop(body);

    let validation = match validator.await {
        Ok(validation) => validation,
        Err(join) => Err(FormatError::Io(io::Error::other(format!(
            "validator task failed: {join}"
        )))),
    };

    let bytes = copied?;
    file.flush().await.map_err(TeeError::Write)?;
    file.sync_all().await.map_err(TeeError::Write)?;
    debug!(bytes, valid = matches!(validation, Ok(Outcome::Valid(_))), "capture copied");

    Ok(TeeReport { bytes, validation })
}

async fn copy_to_sinks<S>(body: &mut S, file: &mut File, pipe: &mut PipeWriter) -> Result<u64, TeeError>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    let mut bytes = 0u64;
    let mut validating = true;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(TeeError::Source)?;
        file.write_all(&chunk).await.map_err(TeeError::Write)?;
        bytes += chunk.len() as u64;
        if validating && !pipe.send(chunk).await {
            warn!("validator stopped reading; continuing download without it");
            validating = false;
        }
    }
    Ok(bytes)
}
