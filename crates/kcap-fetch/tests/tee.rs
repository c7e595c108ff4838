use std::io;

use bytes::Bytes;
use futures_util::{Stream, stream};
use kcap_estream::{FormatError, Outcome};
use kcap_fetch::{TeeError, TeeReport, tee_validate};
use tempfile::NamedTempFile;

const MINIMAL: [u8; 10] = [2, 1, 4, 2, 1, b'a', 6, 0, 7, 0];

fn split(data: &[u8], at: usize) -> Vec<io::Result<Bytes>> {
    data.chunks(at).map(|c| Ok(Bytes::copy_from_slice(c))).collect()
}

/// Run the pipeline into a fresh temporary file and return what landed on disk.
async fn run<S>(body: S) -> (Result<TeeReport, TeeError>, Vec<u8>)
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    let temp = NamedTempFile::new().unwrap();
    let mut file = tokio::fs::File::from_std(temp.as_file().try_clone().unwrap());
    let result = tee_validate(body, &mut file).await;
    drop(file);
    (result, std::fs::read(temp.path()).unwrap())
}

#[tokio::test(flavor = "multi_thread")]
async fn copies_and_validates_minimal_container() {
    let (report, written) = run(stream::iter(split(&MINIMAL, 3))).await;
    let report = report.unwrap();

    assert_eq!(report.bytes, 10);
    assert_eq!(written, MINIMAL);
    let Ok(Outcome::Valid(container)) = report.validation else {
        panic!("expected a valid container, got {:?}", report.validation);
    };
    assert_eq!(container.streams.len(), 1);
    assert_eq!(container.streams[0].name, "a");
    assert_eq!(container.trailing_bytes, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_body_does_not_hang() {
    let (report, written) = run(stream::iter(Vec::new())).await;
    let report = report.unwrap();

    assert_eq!(report.bytes, 0);
    assert!(written.is_empty());
    assert!(matches!(report.validation, Ok(Outcome::Unrecognized { drained: 0 })));
}

#[tokio::test(flavor = "multi_thread")]
async fn non_container_is_fully_written() {
    let data = vec![0x55u8; 300_000];
    let (report, written) = run(stream::iter(split(&data, 4096))).await;
    let report = report.unwrap();

    assert_eq!(report.bytes, data.len() as u64);
    assert_eq!(written, data);
    assert!(matches!(
        report.validation,
        Ok(Outcome::Unrecognized { drained }) if drained == data.len() as u64 - 2
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn structural_error_keeps_every_byte() {
    // Version header followed by an unknown block id, then plenty of payload.
    let mut data = vec![2, 1, 0x42, 0];
    data.extend(std::iter::repeat_n(0xEEu8, 200_000));

    let (report, written) = run(stream::iter(split(&data, 1000))).await;
    let report = report.unwrap();

    assert_eq!(report.bytes, data.len() as u64);
    assert_eq!(written, data);
    assert!(matches!(report.validation, Err(FormatError::UnknownBlock(0x42))));
}

#[tokio::test(flavor = "multi_thread")]
async fn source_error_is_authoritative() {
    let mut chunks = split(&MINIMAL[..5], 5);
    chunks.push(Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away")));
    chunks.push(Ok(Bytes::from_static(b"never read")));

    let (result, written) = run(stream::iter(chunks)).await;

    let Err(TeeError::Source(err)) = result else {
        panic!("expected a source error, got {result:?}");
    };
    assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    assert_eq!(written, &MINIMAL[..5]);
}

#[tokio::test(flavor = "multi_thread")]
async fn single_byte_chunks() {
    let (report, written) = run(stream::iter(split(&MINIMAL, 1))).await;

    assert!(report.unwrap().validation.unwrap().is_valid());
    assert_eq!(written, MINIMAL);
}
