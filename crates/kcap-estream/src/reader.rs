use std::io::{self, Read};

use tracing::trace;

use crate::block::{self, BlockId, MAJOR_VERSION, MAX_HEADER_BLOCK};
use crate::{FormatError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    pub name:      String,
    pub encrypted: bool,
}

/// Sequential reader over a container.
///
/// Sub-streams must be consumed in order. Calling [`Reader::next_stream`]
/// while a sub-stream is still open skips the rest of it first.
pub struct Reader<R> {
    inner:    R,
    version:  Version,
    keys:     usize,
    open:     bool,
    finished: bool,
}

impl<R: Read> Reader<R> {
    /// Parse the container header.
    ///
    /// Fails with [`FormatError::MissingHeader`] or
    /// [`FormatError::UnsupportedVersion`] when the input is not a container.
    pub fn new(mut inner: R) -> Result<Self> {
        let mut header = [0u8; 2];
        inner.read_exact(&mut header).map_err(|err| match err.kind() {
            io::ErrorKind::UnexpectedEof => FormatError::MissingHeader,
            _ => FormatError::Io(err),
        })?;

        let version = Version {
            major: header[0],
            minor: header[1],
        };
        if version.major != MAJOR_VERSION {
            return Err(FormatError::UnsupportedVersion {
                major: version.major,
                minor: version.minor,
            });
        }

        Ok(Self {
            inner,
            version,
            keys: 0,
            open: false,
            finished: false,
        })
    }

    pub fn version(&self) -> Version { self.version }

    /// Number of key blocks passed so far.
    pub fn key_blocks(&self) -> usize { self.keys }

    pub fn is_finished(&self) -> bool { self.finished }

    /// Advance to the next sub-stream. Returns `None` at the end-of-file marker.
    pub fn next_stream(&mut self) -> Result<Option<SubStream<'_, R>>> {
        if self.finished {
            return Ok(None);
        }
        if self.open {
            self.skip_data()?;
        }

        loop {
            let (id, len) = self.read_block_header()?;
            match id {
                BlockId::PlainKey | BlockId::EncryptedKey => {
                    self.read_bounded(id, len)?;
                    self.keys += 1;
                }
                BlockId::PlainStream | BlockId::EncryptedStream => {
                    let payload = self.read_bounded(id, len)?;
                    let header = StreamHeader {
                        name:      block::parse_stream_name(&payload)?,
                        encrypted: id == BlockId::EncryptedStream,
                    };
                    trace!(name = %header.name, encrypted = header.encrypted, "sub-stream");
                    self.open = true;
                    return Ok(Some(SubStream {
                        reader: self,
                        header,
                    }));
                }
                BlockId::EndOfFile => {
                    self.skip_payload(len)?;
                    self.finished = true;
                    return Ok(None);
                }
                BlockId::Error => return Err(self.remote_error(len)),
                BlockId::Extension(_) => {
                    self.skip_payload(len)?;
                }
                BlockId::DataBlock | BlockId::EndOfStream => {
                    return Err(FormatError::UnexpectedBlock {
                        block:   id,
                        context: "outside a sub-stream",
                    });
                }
            }
        }
    }

    pub fn into_inner(self) -> R { self.inner }

    fn skip_data(&mut self) -> Result<u64> {
        let mut total = 0u64;
        loop {
            let (id, len) = self.read_block_header()?;
            match id {
                BlockId::DataBlock => total += self.skip_payload(len)?,
                BlockId::EndOfStream => {
                    self.skip_payload(len)?;
                    self.open = false;
                    return Ok(total);
                }
                BlockId::Error => return Err(self.remote_error(len)),
                BlockId::Extension(_) => {
                    self.skip_payload(len)?;
                }
                _ => {
                    return Err(FormatError::UnexpectedBlock {
                        block:   id,
                        context: "inside a sub-stream",
                    });
                }
            }
        }
    }

    fn read_block_header(&mut self) -> Result<(BlockId, u64)> {
        let mut id = [0u8; 1];
        self.inner.read_exact(&mut id)?;
        let id = BlockId::from_u8(id[0])?;
        let len = block::read_uvarint(&mut self.inner)?;
        Ok((id, len))
    }

    fn read_bounded(&mut self, id: BlockId, len: u64) -> Result<Vec<u8>> {
        if len > MAX_HEADER_BLOCK {
            return Err(FormatError::BlockTooLarge {
                block: id,
                len,
                max: MAX_HEADER_BLOCK,
            });
        }
        let mut payload = vec![0u8; len as usize];
        self.inner.read_exact(&mut payload)?;
        Ok(payload)
    }

    fn skip_payload(&mut self, len: u64) -> Result<u64> {
        let copied = io::copy(&mut (&mut self.inner).take(len), &mut io::sink())?;
        if copied < len {
            return Err(FormatError::Truncated);
        }
        Ok(copied)
    }

    fn remote_error(&mut self, len: u64) -> FormatError {
        match self.read_bounded(BlockId::Error, len) {
            Ok(payload) => FormatError::Remote(String::from_utf8_lossy(&payload).into_owned()),
            Err(err) => err,
        }
    }
}

/// An open sub-stream. Its payload is never decoded, only skipped.
pub struct SubStream<'a, R> {
    reader: &'a mut Reader<R>,
    header: StreamHeader,
}

impl<R: Read> SubStream<'_, R> {
    pub fn header(&self) -> &StreamHeader { &self.header }

    pub fn name(&self) -> &str { &self.header.name }

    pub fn is_encrypted(&self) -> bool { self.header.encrypted }

    /// Skip the payload up to the end-of-stream marker and return its size.
    /// Encrypted and plain payloads are skipped the same way.
    pub fn skip(self) -> Result<u64> { self.reader.skip_data() }
}
