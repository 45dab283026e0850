use bitmap::{decode_bitmap, encode_bitmap, encode_snapshot_base64, Limits};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use raster::{RasterBuffer, Rgba};

fn sample_canvas() -> RasterBuffer {
    let mut buffer = RasterBuffer::canvas();
    for i in 0..40 {
        let color = if i % 2 == 0 { Rgba::BLACK } else { Rgba::RED };
        buffer.fill_rect(i * 20, i * 10, i * 20 + 15, i * 10 + 40, color);
    }
    buffer
}

fn bench_codecs(c: &mut Criterion) {
    let frame = sample_canvas().snapshot();
    let bytes = encode_bitmap(&frame);
    let limits = Limits::default();

    c.bench_function("encode_bitmap_canvas", |b| {
        b.iter(|| encode_bitmap(black_box(&frame)));
    });
    c.bench_function("decode_bitmap_canvas", |b| {
        b.iter(|| decode_bitmap(black_box(&bytes), &limits));
    });
    c.bench_function("encode_snapshot_base64_canvas", |b| {
        b.iter(|| encode_snapshot_base64(black_box(&frame)));
    });
}

criterion_group!(benches, bench_codecs);
criterion_main!(benches);
