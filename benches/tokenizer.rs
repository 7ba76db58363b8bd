//! Criterion benchmarks for the streaming tokenizer's throughput.
//!
//! Run with:
//!   cargo bench --bench tokenizer

use std::io::Cursor;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use xmltok::{Limits, Options, Token, TokenType, Tokenizer};

/// Builds a synthetic multi-megabyte document of repeated nested elements
/// with a handful of attributes and a short text run, similar in shape to a
/// record-oriented export format.
fn synthetic_document(target_bytes: usize) -> Vec<u8> {
    let mut doc = Vec::with_capacity(target_bytes + 64);
    doc.extend_from_slice(b"<root>");
    let record = br#"<record id="1" kind="sample"><name>widget</name><qty>42</qty></record>"#;
    while doc.len() < target_bytes {
        doc.extend_from_slice(record);
    }
    doc.extend_from_slice(b"</root>");
    doc
}

fn bench_tokenize_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize_throughput");

    for &size in &[1 << 20, 8 << 20] {
        let doc = synthetic_document(size);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::new("synthetic_records", size), &doc, |b, doc| {
            b.iter(|| {
                let mut tok = Tokenizer::from_reader(
                    Cursor::new(doc.clone()),
                    64 * 1024,
                    Options::default(),
                    Limits::default(),
                )
                .unwrap();
                let mut t = Token::empty(TokenType::DocumentStart, 0, 1, 1);
                let mut count = 0u64;
                while tok.next_token(&mut t) {
                    count += 1;
                }
                count
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tokenize_throughput);
criterion_main!(benches);
