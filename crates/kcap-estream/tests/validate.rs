use std::io::{self, Cursor, Read};

use kcap_estream::{FormatError, Outcome, Writer, validate};

/// Counts bytes handed out so tests can assert full consumption.
struct Counting<R> {
    inner: R,
    read:  u64,
}

impl<R: Read> Read for Counting<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;
        Ok(n)
    }
}

fn counting(data: &[u8]) -> Counting<Cursor<Vec<u8>>> {
    Counting {
        inner: Cursor::new(data.to_vec()),
        read:  0,
    }
}

#[test]
fn single_stream_container_is_valid() {
    let mut writer = Writer::new(Vec::new()).unwrap();
    writer.start_stream("a", false).unwrap();
    writer.end_stream().unwrap();
    let data = writer.finish().unwrap();
    assert_eq!(data.len(), 10);

    let mut input = counting(&data);
    let outcome = validate(&mut input).unwrap();

    let Outcome::Valid(report) = outcome else {
        panic!("expected a valid container, got {outcome:?}");
    };
    assert_eq!(report.streams.len(), 1);
    assert_eq!(report.streams[0].name, "a");
    assert!(!report.streams[0].encrypted);
    assert_eq!(report.trailing_bytes, 0);
    assert_eq!(input.read, 10);
}

#[test]
fn encrypted_payloads_are_skipped_without_a_key() {
    let mut writer = Writer::new(Vec::new()).unwrap();
    writer.write_key(&[7u8; 48], true).unwrap();
    for i in 0..3 {
        writer.start_stream(&format!("disk{i}/xl.meta"), true).unwrap();
        writer.write_data(&vec![i as u8; 4096]).unwrap();
        writer.write_data(&vec![i as u8; 100]).unwrap();
        writer.end_stream().unwrap();
    }
    let data = writer.finish().unwrap();

    let Outcome::Valid(report) = validate(&data[..]).unwrap() else {
        panic!("expected a valid container");
    };
    assert_eq!(report.key_blocks, 1);
    assert_eq!(report.streams.len(), 3);
    assert!(report.streams.iter().all(|s| s.encrypted && s.bytes == 4196));
}

#[test]
fn non_container_input_is_drained_without_error() {
    let data = b"PK\x03\x04 this is a zip, not a container".repeat(100);
    let mut input = counting(&data);

    let outcome = validate(&mut input).unwrap();

    assert_eq!(
        outcome,
        Outcome::Unrecognized {
            drained: data.len() as u64 - 2
        }
    );
    assert_eq!(input.read, data.len() as u64);
}

#[test]
fn empty_input_is_unrecognized() {
    let outcome = validate(&[0u8; 0][..]).unwrap();
    assert_eq!(outcome, Outcome::Unrecognized { drained: 0 });
}

#[test]
fn malformed_stream_header_fails_and_consumes_input() {
    // Valid header, then a stream header whose name length overruns the block.
    let mut data = vec![2, 1, 4, 2, 9, b'a'];
    data.extend_from_slice(&[0u8; 500]);
    let mut input = counting(&data);

    let err = validate(&mut input).unwrap_err();

    assert!(matches!(err, FormatError::MalformedHeader(_)), "{err:?}");
    assert_eq!(input.read, data.len() as u64);
}

#[test]
fn truncated_container_fails() {
    let mut writer = Writer::new(Vec::new()).unwrap();
    writer.start_stream("a", false).unwrap();
    writer.write_data(&[1u8; 64]).unwrap();
    writer.end_stream().unwrap();
    let mut data = writer.finish().unwrap();
    data.truncate(data.len() - 3);

    assert!(matches!(validate(&data[..]), Err(FormatError::Truncated)));
}

#[test]
fn trailing_bytes_are_reported() {
    let writer = Writer::new(Vec::new()).unwrap();
    let mut data = writer.finish().unwrap();
    data.extend_from_slice(b"junk");

    let Outcome::Valid(report) = validate(&data[..]).unwrap() else {
        panic!("expected a valid container");
    };
    assert!(report.streams.is_empty());
    assert_eq!(report.trailing_bytes, 4);
}

#[test]
fn read_errors_are_propagated() {
    struct Failing;
    impl Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    let input = Cursor::new(vec![2u8, 1, 4, 2, 1, b'a']).chain(Failing);
    match validate(input) {
        Err(FormatError::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::ConnectionReset),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}
