use std::io;

use futures_util::StreamExt;
use tracing::debug;

use super::{Capture, CaptureSource, Target, unframe};
use crate::error::{Result, SourceError};

/// Retrieves captures from a cluster endpoint: `GET {url}/inspect-data`.
pub struct HttpSource {
    client: reqwest::Client,
    url:    String,
    token:  Option<String>,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let url = url.into();
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_owned(),
            token,
        })
    }
}

impl CaptureSource for HttpSource {
    type Error = SourceError;

    async fn open(&self, target: &Target) -> Result<Capture> {
        let endpoint = format!("{}/inspect-data", self.url);
        debug!(%endpoint, volume = %target.volume, file = %target.file, "requesting capture");

        let mut request = self
            .client
            .get(&endpoint)
            .query(&[("volume", &target.volume), ("file", &target.file)]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let total = response.content_length();
        let body = response.bytes_stream().map(|chunk| chunk.map_err(io::Error::other));

        unframe(Box::pin(body), total).await
    }
}
