use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ns3_trace_extractor::{parse_frames, render, FrameRecord};

fn synthetic_frames(count: u64) -> Vec<FrameRecord> {
    (0..count)
        .map(|index| FrameRecord {
            index,
            frame_type: match index % 12 {
                0 => 'I',
                n if n % 3 == 0 => 'P',
                _ => 'B',
            },
            timestamp: index as f64 / 25.0,
            byte_size: 1000 + (index * 37) % 20_000,
        })
        .collect()
}

/// Benchmark trace rendering for a one-hour 25fps video
fn bench_render(c: &mut Criterion) {
    let frames = synthetic_frames(90_000);

    c.bench_function("render_90k_frames", |b| {
        b.iter(|| render(black_box(&frames)))
    });
}

/// Benchmark decoding of ffprobe JSON output
fn bench_parse(c: &mut Criterion) {
    let body: Vec<String> = synthetic_frames(10_000)
        .iter()
        .map(|f| {
            format!(
                r#"{{"media_type":"video","pts_time":"{:.6}","pkt_size":"{}","pict_type":"{}","coded_picture_number":{}}}"#,
                f.timestamp, f.byte_size, f.frame_type, f.index
            )
        })
        .collect();
    let json = format!(r#"{{"frames":[{}]}}"#, body.join(","));

    c.bench_function("parse_10k_frames", |b| {
        b.iter(|| parse_frames(black_box(json.as_bytes())))
    });
}

criterion_group!(benches, bench_render, bench_parse);
criterion_main!(benches);
