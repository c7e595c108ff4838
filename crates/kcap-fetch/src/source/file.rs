use std::io;
use std::path::PathBuf;

use bytes::{Bytes, BytesMut};
use futures_util::stream;
use tokio::io::AsyncReadExt;
use tracing::debug;

use super::{Capture, CaptureSource, Target, unframe};
use crate::error::{Result, SourceError};

const CHUNK_SIZE: usize = 64 << 10;

/// Replays captures stored on local disk as `{root}/{volume}/{file}`.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }
}

impl CaptureSource for FileSource {
    type Error = SourceError;

    async fn open(&self, target: &Target) -> Result<Capture> {
        let path = self.root.join(&target.volume).join(&target.file);
        debug!(path = %path.display(), "replaying capture from disk");

        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|source| SourceError::Open {
                path: path.clone(),
                source,
            })?;
        let total = file.metadata().await.ok().map(|meta| meta.len());

        let body = stream::try_unfold(file, |mut file| async move {
            let mut buf = BytesMut::zeroed(CHUNK_SIZE);
            let n = file.read(&mut buf).await?;
            if n == 0 {
                return Ok::<_, io::Error>(None);
            }
            buf.truncate(n);
            Ok(Some((Bytes::from(buf), file)))
        });

        unframe(Box::pin(body), total).await
    }
}
