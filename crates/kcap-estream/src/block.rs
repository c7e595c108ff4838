use std::fmt;
use std::io::{self, Read, Write};

use crate::{FormatError, Result};

pub const MAJOR_VERSION: u8 = 2;
pub const MINOR_VERSION: u8 = 1;

/// Upper bound for blocks whose payload is buffered (keys, sub-stream headers, errors).
pub const MAX_HEADER_BLOCK: u64 = 64 << 10;

const MAX_VARINT_LEN: usize = 10;

/// Ids at or above this value are extensions and are skipped by readers.
const EXTENSION_BASE: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockId {
    PlainKey,
    EncryptedKey,
    EncryptedStream,
    PlainStream,
    DataBlock,
    EndOfStream,
    EndOfFile,
    Error,
    Extension(u8),
}

impl BlockId {
    pub fn from_u8(id: u8) -> Result<Self> {
        Ok(match id {
            1 => Self::PlainKey,
            2 => Self::EncryptedKey,
            3 => Self::EncryptedStream,
            4 => Self::PlainStream,
            5 => Self::DataBlock,
            6 => Self::EndOfStream,
            7 => Self::EndOfFile,
            8 => Self::Error,
            id if id >= EXTENSION_BASE => Self::Extension(id),
            id => return Err(FormatError::UnknownBlock(id)),
        })
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::PlainKey => 1,
            Self::EncryptedKey => 2,
            Self::EncryptedStream => 3,
            Self::PlainStream => 4,
            Self::DataBlock => 5,
            Self::EndOfStream => 6,
            Self::EndOfFile => 7,
            Self::Error => 8,
            Self::Extension(id) => id,
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlainKey => write!(f, "plain-key"),
            Self::EncryptedKey => write!(f, "encrypted-key"),
            Self::EncryptedStream => write!(f, "encrypted-stream"),
            Self::PlainStream => write!(f, "plain-stream"),
            Self::DataBlock => write!(f, "data"),
            Self::EndOfStream => write!(f, "end-of-stream"),
            Self::EndOfFile => write!(f, "end-of-file"),
            Self::Error => write!(f, "error"),
            Self::Extension(id) => write!(f, "extension({id:#04x})"),
        }
    }
}

/// Read an unsigned LEB128 varint.
pub fn read_uvarint<R: Read>(reader: &mut R) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    for i in 0..MAX_VARINT_LEN {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;
        let b = byte[0];
        if i == MAX_VARINT_LEN - 1 && b > 1 {
            return Err(FormatError::VarintOverflow);
        }
        value |= u64::from(b & 0x7f) << shift;
        if b & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
    Err(FormatError::VarintOverflow)
}

pub fn write_uvarint<W: Write>(writer: &mut W, mut value: u64) -> io::Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let mut n = 0;
    while value >= 0x80 {
        buf[n] = (value as u8) | 0x80;
        value >>= 7;
        n += 1;
    }
    buf[n] = value as u8;
    writer.write_all(&buf[..=n])
}

/// Name of a sub-stream, decoded from a stream header payload.
pub(crate) fn parse_stream_name(payload: &[u8]) -> Result<String> {
    let mut cursor = payload;
    let len = read_uvarint(&mut cursor)
        .map_err(|_| FormatError::MalformedHeader("name length"))?;
    if len > cursor.len() as u64 {
        return Err(FormatError::MalformedHeader("name exceeds header"));
    }
    let name = &cursor[..len as usize];
    String::from_utf8(name.to_vec()).map_err(|_| FormatError::MalformedHeader("name is not UTF-8"))
}
