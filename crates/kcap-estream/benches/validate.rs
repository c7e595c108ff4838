use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use kcap_estream::{Writer, validate};

fn container(streams: usize, block: usize, blocks: usize) -> Vec<u8> {
    let mut writer = Writer::new(Vec::new()).unwrap();
    let payload = vec![0x5a; block];
    for i in 0..streams {
        writer.start_stream(&format!("disk{i}/xl.meta"), i % 2 == 0).unwrap();
        for _ in 0..blocks {
            writer.write_data(&payload).unwrap();
        }
        writer.end_stream().unwrap();
    }
    writer.finish().unwrap()
}

fn bench_validate(c: &mut Criterion) {
    let data = container(16, 64 << 10, 16);
    let mut group = c.benchmark_group("validate");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("16x1MiB", |b| b.iter(|| validate(black_box(&data[..])).unwrap()));
    group.finish();
}

criterion_group!(benches, bench_validate);
criterion_main!(benches);
