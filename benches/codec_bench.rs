//! Benchmark: encode and decode a torrent-like record, a generic value tree and a
//! large flat map. Records are measured both through a reused codec (warm field
//! cache) and through the free functions (fresh codec per call).

use bencode_codec::{decode, encode, record, ByteBuf, Codec, Value};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;

#[derive(Debug, Default, PartialEq)]
struct Info {
    length: u64,
    name: String,
    piece_length: u32,
    pieces: ByteBuf,
}

record!(Info {
    length,
    name,
    piece_length: "piece length",
    pieces,
});

#[derive(Debug, Default, PartialEq)]
struct Torrent {
    announce: String,
    announce_list: Vec<Vec<String>>,
    comment: String,
    info: Info,
}

record!(Torrent {
    announce,
    announce_list: "announce-list,omitempty",
    comment: ",omitempty",
    info,
});

fn sample_torrent() -> Torrent {
    Torrent {
        announce: "http://tracker.example/announce".into(),
        announce_list: (0..8)
            .map(|i| vec![format!("udp://tracker{}.example:6969", i)])
            .collect(),
        comment: "benchmark".into(),
        info: Info {
            length: 4 << 30,
            name: "image.iso".into(),
            piece_length: 1 << 20,
            pieces: ByteBuf((0..20 * 4096).map(|i| (i % 251) as u8).collect()),
        },
    }
}

fn bench_codec(c: &mut Criterion) {
    let codec = Codec::default();
    let torrent = sample_torrent();
    let torrent_bytes = codec.encode(&torrent).expect("encode torrent");

    c.bench_function("encode_record", |b| {
        b.iter(|| codec.encode(black_box(&torrent)).expect("encode"))
    });
    c.bench_function("encode_record_fresh_codec", |b| {
        b.iter(|| encode(black_box(&torrent)).expect("encode"))
    });
    c.bench_function("decode_record", |b| {
        b.iter(|| codec.decode_into::<Torrent>(black_box(&torrent_bytes)).expect("decode"))
    });
    c.bench_function("decode_value", |b| {
        b.iter(|| decode(black_box(&torrent_bytes)).expect("decode"))
    });

    let value: Value = decode(&torrent_bytes).expect("decode");
    c.bench_function("encode_value", |b| {
        b.iter(|| codec.encode(black_box(&value)).expect("encode"))
    });

    let map: HashMap<String, i64> = (0..10_000).map(|i| (format!("key{:05}", i), i)).collect();
    let map_bytes = codec.encode(&map).expect("encode map");
    c.bench_function("encode_map_10k", |b| {
        b.iter(|| codec.encode(black_box(&map)).expect("encode"))
    });
    c.bench_function("decode_map_10k", |b| {
        b.iter(|| codec.decode_into::<HashMap<String, i64>>(black_box(&map_bytes)).expect("decode"))
    });
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
