use std::io::{self, Write};

use crate::block::{self, BlockId, MAJOR_VERSION, MINOR_VERSION};

/// Produces containers. Used to build fixtures and by tests.
pub struct Writer<W> {
    inner: W,
}

impl<W: Write> Writer<W> {
    pub fn new(mut inner: W) -> io::Result<Self> {
        inner.write_all(&[MAJOR_VERSION, MINOR_VERSION])?;
        Ok(Self { inner })
    }

    pub fn write_key(&mut self, key: &[u8], encrypted: bool) -> io::Result<()> {
        let id = if encrypted { BlockId::EncryptedKey } else { BlockId::PlainKey };
        self.write_block(id, key)
    }

    pub fn start_stream(&mut self, name: &str, encrypted: bool) -> io::Result<()> {
        let id = if encrypted { BlockId::EncryptedStream } else { BlockId::PlainStream };
        let mut header = Vec::with_capacity(name.len() + 2);
        block::write_uvarint(&mut header, name.len() as u64)?;
        header.extend_from_slice(name.as_bytes());
        self.write_block(id, &header)
    }

    pub fn write_data(&mut self, data: &[u8]) -> io::Result<()> {
        self.write_block(BlockId::DataBlock, data)
    }

    pub fn end_stream(&mut self) -> io::Result<()> { self.write_block(BlockId::EndOfStream, &[]) }

    pub fn write_error(&mut self, message: &str) -> io::Result<()> {
        self.write_block(BlockId::Error, message.as_bytes())
    }

    /// Write the end-of-file marker and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.write_block(BlockId::EndOfFile, &[])?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_block(&mut self, id: BlockId, payload: &[u8]) -> io::Result<()> {
        self.inner.write_all(&[id.as_u8()])?;
        block::write_uvarint(&mut self.inner, payload.len() as u64)?;
        self.inner.write_all(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_container_layout() {
        let mut writer = Writer::new(Vec::new()).unwrap();
        writer.start_stream("a", false).unwrap();
        writer.end_stream().unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes, [2, 1, 4, 2, 1, b'a', 6, 0, 7, 0]);
    }

    #[test]
    fn encrypted_stream_uses_its_own_id() {
        let mut writer = Writer::new(Vec::new()).unwrap();
        writer.start_stream("b", true).unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes[2], BlockId::EncryptedStream.as_u8());
    }
}
