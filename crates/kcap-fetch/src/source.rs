//! Remote capture sources.
//!
//! A source turns a [`Target`] into a [`Capture`]: the optional decryption key
//! and a read-once byte stream. Both adapters share the same body framing: a
//! framing version byte, then for version 1 a 32-byte key, then the container.

use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::str::FromStr;

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt, stream};

use crate::error::{Result, SourceError};

mod file;
#[cfg(feature = "reqwest")]
mod http;

pub use file::FileSource;
#[cfg(feature = "reqwest")]
pub use http::HttpSource;

pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Framing version carrying a 32-byte key ahead of the container.
pub const FRAMING_WITH_KEY: u8 = 1;
/// Framing version carrying the container alone.
pub const FRAMING_PLAIN: u8 = 2;
pub const KEY_LEN: usize = 32;

/// `ALIAS/BUCKET/PREFIX`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub alias:  String,
    pub volume: String,
    pub file:   String,
}

impl Target {
    pub fn parts(&self) -> [&str; 3] { [&self.alias, &self.volume, &self.file] }

    pub fn has_wildcard(&self) -> bool { self.file.contains('*') }
}

impl FromStr for Target {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.replace('\\', "/");
        let mut parts = normalized.splitn(3, '/');
        let mut next = || parts.next().filter(|p| !p.is_empty()).map(str::to_owned);
        match (next(), next(), next()) {
            (Some(alias), Some(volume), Some(file)) => Ok(Self {
                alias,
                volume,
                file,
            }),
            _ => Err(SourceError::InvalidTarget(s.to_owned())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.alias, self.volume, self.file)
    }
}

/// An opened capture. Dropping `body` closes the underlying handle.
pub struct Capture {
    pub key:   Option<Vec<u8>>,
    /// Declared container length, when the source knows it.
    pub total: Option<u64>,
    pub body:  BoxStream<'static, io::Result<Bytes>>,
}

impl fmt::Debug for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capture")
            .field("encrypted", &self.key.is_some())
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

pub trait CaptureSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Start retrieving the capture for `target`.
    fn open(&self, target: &Target) -> impl Future<Output = std::result::Result<Capture, Self::Error>> + Send;
}

/// Any of the built-in sources, chosen from an alias url.
pub enum AnySource {
    File(FileSource),
    #[cfg(feature = "reqwest")]
    Http(HttpSource),
}

impl AnySource {
    /// `file://` urls replay from disk, `http(s)://` urls go over the network.
    pub fn from_url(url: &str, token: Option<String>) -> Result<Self> {
        if let Some(root) = url.strip_prefix("file://") {
            return Ok(Self::File(FileSource::new(root)));
        }
        #[cfg(feature = "reqwest")]
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(Self::Http(HttpSource::new(url, token)?));
        }
        let _ = token;
        Err(SourceError::InvalidUrl(url.to_owned()))
    }
}

impl CaptureSource for AnySource {
    type Error = SourceError;

    async fn open(&self, target: &Target) -> Result<Capture> {
        match self {
            Self::File(source) => source.open(target).await,
            #[cfg(feature = "reqwest")]
            Self::Http(source) => source.open(target).await,
        }
    }
}

fn framing_len(prefix: &[u8]) -> usize {
    match prefix.first() {
        Some(&FRAMING_WITH_KEY) => 1 + KEY_LEN,
        _ => 1,
    }
}

/// Strip the framing prefix off `body`, returning the key and the container stream.
pub async fn unframe(
    mut body: BoxStream<'static, io::Result<Bytes>>,
    total: Option<u64>,
) -> Result<Capture> {
    let mut prefix = BytesMut::new();
    while prefix.len() < framing_len(&prefix) {
        match body.next().await {
            Some(chunk) => prefix.extend_from_slice(&chunk.map_err(SourceError::Read)?),
            None => return Err(SourceError::Framing("stream ended inside the framing prefix".into())),
        }
    }

    let mut prefix = prefix.freeze();
    let head = framing_len(&prefix);
    let key = match prefix[0] {
        FRAMING_WITH_KEY => Some(prefix[1..head].to_vec()),
        FRAMING_PLAIN => None,
        other => return Err(SourceError::Framing(format!("unknown framing version {other}"))),
    };

    let rest = prefix.split_off(head);
    let body = if rest.is_empty() {
        body
    } else {
        Box::pin(stream::once(async move { Ok(rest) }).chain(body))
    };

    Ok(Capture {
        key,
        total: total.map(|total| total.saturating_sub(head as u64)),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(parts: Vec<Vec<u8>>) -> BoxStream<'static, io::Result<Bytes>> {
        Box::pin(stream::iter(parts.into_iter().map(|p| Ok(Bytes::from(p)))))
    }

    async fn collect(body: BoxStream<'static, io::Result<Bytes>>) -> Vec<u8> {
        body.map(|chunk| chunk.unwrap().to_vec()).concat().await
    }

    #[test]
    fn parses_targets() {
        let target: Target = "play/bucket/dir/obj*/xl.meta".parse().unwrap();
        assert_eq!(target.alias, "play");
        assert_eq!(target.volume, "bucket");
        assert_eq!(target.file, "dir/obj*/xl.meta");
        assert!(target.has_wildcard());
        assert_eq!(target.to_string(), "play/bucket/dir/obj*/xl.meta");

        let windows: Target = r"play\bucket\obj".parse().unwrap();
        assert_eq!(windows.file, "obj");
    }

    #[test]
    fn rejects_incomplete_targets() {
        for bad in ["", "play", "play/bucket", "play//obj", "/bucket/obj", "play/bucket/"] {
            assert!(bad.parse::<Target>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[tokio::test]
    async fn unframes_plain_body() {
        let capture = unframe(chunks(vec![vec![FRAMING_PLAIN, 2, 1], vec![7, 0]]), Some(5))
            .await
            .unwrap();
        assert!(capture.key.is_none());
        assert_eq!(capture.total, Some(4));
        assert_eq!(collect(capture.body).await, [2, 1, 7, 0]);
    }

    #[tokio::test]
    async fn unframes_key_split_across_chunks() {
        let mut first = vec![FRAMING_WITH_KEY];
        first.extend([0xAA; 9]);
        let capture = unframe(chunks(vec![first, vec![0xAA; 26], b"rest".to_vec()]), None)
            .await
            .unwrap();
        let key = capture.key.clone().unwrap();
        assert_eq!(key.len(), KEY_LEN);
        assert!(key.iter().all(|b| *b == 0xAA));
        assert_eq!(collect(capture.body).await, [0xAA, 0xAA, 0xAA, b'r', b'e', b's', b't']);
    }

    #[tokio::test]
    async fn rejects_unknown_framing() {
        let err = unframe(chunks(vec![vec![9, 1, 2]]), None).await.unwrap_err();
        assert!(matches!(err, SourceError::Framing(_)));

        let err = unframe(chunks(vec![]), None).await.unwrap_err();
        assert!(matches!(err, SourceError::Framing(_)));
    }
}
