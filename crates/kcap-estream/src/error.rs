use std::io;

use crate::block::BlockId;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("container header missing")]
    MissingHeader,

    #[error("unsupported container version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("container truncated before end-of-file marker")]
    Truncated,

    #[error("varint overflows 64 bits")]
    VarintOverflow,

    #[error("unknown block id {0:#04x}")]
    UnknownBlock(u8),

    #[error("unexpected {block} block {context}")]
    UnexpectedBlock {
        block:   BlockId,
        context: &'static str,
    },

    #[error("{block} block of {len} bytes exceeds the {max} byte limit")]
    BlockTooLarge { block: BlockId, len: u64, max: u64 },

    #[error("malformed sub-stream header: {0}")]
    MalformedHeader(&'static str),

    #[error("producer reported an error: {0}")]
    Remote(String),

    #[error(transparent)]
    Io(io::Error),
}

impl FormatError {
    /// True when the input never looked like a container.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::MissingHeader | Self::UnsupportedVersion { .. })
    }
}

impl From<io::Error> for FormatError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::Truncated,
            _ => Self::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
