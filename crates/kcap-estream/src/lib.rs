//! Structural reader and validator for inspect capture containers.
//!
//! A container is a two byte version header followed by length-prefixed
//! blocks. Named sub-streams are opened by a stream header block, carry their
//! payload in data blocks and close with an end-of-stream block; the container
//! ends with an end-of-file block.
//!
//! Payloads are never decoded. Encrypted sub-streams are skipped exactly like
//! plain ones, so validation needs no key material.
//!
//! # Example
//!
//! ```
//! use kcap_estream::{validate, Outcome, Writer};
//!
//! let mut writer = Writer::new(Vec::new()).unwrap();
//! writer.start_stream("xl.meta", true).unwrap();
//! writer.write_data(b"ciphertext").unwrap();
//! writer.end_stream().unwrap();
//! let bytes = writer.finish().unwrap();
//!
//! match validate(&bytes[..]).unwrap() {
//!     Outcome::Valid(report) => assert_eq!(report.streams[0].bytes, 10),
//!     Outcome::Unrecognized { .. } => unreachable!(),
//! }
//! ```

pub use self::block::{BlockId, MAJOR_VERSION, MAX_HEADER_BLOCK, MINOR_VERSION};
pub use self::error::{FormatError, Result};
pub use self::reader::{Reader, StreamHeader, SubStream, Version};
pub use self::validate::{ContainerReport, Outcome, StreamSummary, validate};
pub use self::writer::Writer;

mod block;
mod error;
mod reader;
mod validate;
mod writer;
