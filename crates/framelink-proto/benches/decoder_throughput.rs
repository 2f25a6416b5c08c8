// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Decoder/encoder throughput microbenchmarks.
//!
//! Fixed inputs, no I/O. The decoder path is the one that runs against a live
//! link, so it is measured both on clean traffic and on noisy traffic.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use framelink_proto::{crc16_ccitt, FrameConfig, FrameDecoder, FrameEncoder};

fn build_stream(frame_count: usize, payload_len: usize, noise_every: usize) -> Vec<u8> {
    let mut encoder = FrameEncoder::with_default_config();
    let payload: Vec<u8> = (0..payload_len).map(|i| (i * 7) as u8).collect();
    let mut stream = Vec::new();

    for i in 0..frame_count {
        if noise_every > 0 && i % noise_every == 0 {
            stream.extend_from_slice(&[0x00, 0x13, 0x7E, 0xFF]);
        }
        // Encoder output for default config cannot fail at these sizes
        if let Ok(frame) = encoder.encode((i % 256) as u8, &payload) {
            stream.extend_from_slice(frame);
        }
    }
    stream
}

fn bench_decoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder_feed");
    group.sample_size(20);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    for &(payload_len, noise_every) in &[(8usize, 0usize), (64, 0), (256, 0), (64, 4)] {
        let stream = build_stream(256, payload_len, noise_every);
        group.throughput(Throughput::Bytes(stream.len() as u64));

        let label = if noise_every == 0 {
            format!("{}B", payload_len)
        } else {
            format!("{}B_noisy", payload_len)
        };

        group.bench_with_input(BenchmarkId::new("feed_slice", label), &stream, |b, stream| {
            let mut decoder: FrameDecoder<_> =
                FrameDecoder::new(FrameConfig::default(), |cmd: u8, payload: &[u8]| {
                    black_box((cmd, payload.len()));
                })
                .expect("default config fits default capacity");
            b.iter(|| decoder.feed_slice(black_box(stream)));
        });
    }

    group.finish();
}

fn bench_encoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoder");
    group.sample_size(20);

    for &payload_len in &[8usize, 64, 256] {
        let payload = vec![0x5Au8; payload_len];
        group.throughput(Throughput::Bytes(payload_len as u64));
        group.bench_with_input(BenchmarkId::new("encode", payload_len), &payload, |b, payload| {
            let mut encoder = FrameEncoder::with_default_config();
            b.iter(|| {
                let _ = black_box(encoder.encode(0x10, black_box(payload)));
            });
        });
    }

    group.finish();
}

fn bench_checksum(c: &mut Criterion) {
    let data = vec![0xA5u8; 1024];
    let mut group = c.benchmark_group("checksum");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("crc16_ccitt_1k", |b| b.iter(|| crc16_ccitt(black_box(&data))));
    group.finish();
}

criterion_group!(benches, bench_decoder, bench_encoder, bench_checksum);
criterion_main!(benches);
