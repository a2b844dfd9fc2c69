//! Benchmarks for tokenizing, sniffing and whole-text parsing.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::time::Duration;
use term_csv::prelude::*;
use term_csv::sniff::{detect_delimiter, EncodingSniffer, TextEncoding};
use term_csv::tokenizer::LineTokenizer;

fn sample_text(rows: usize) -> String {
    let mut text = String::from("id,name,email,amount,created\n");
    for i in 0..rows {
        text.push_str(&format!(
            "{i},\"Customer {i}, Ltd\",user{i}@example.com,{}.{:02},2024-01-{:02} 10:00:00\n",
            i * 3,
            i % 100,
            i % 28 + 1
        ));
    }
    text
}

fn customer_schema() -> Schema {
    let mut schema = Schema::new();
    schema
        .add_int("id", ValidationRule::new().required())
        .and_then(|s| s.add_string("name", ValidationRule::new().max_length(64)))
        .and_then(|s| {
            s.add_string(
                "email",
                ValidationRule::new().pattern(r"^[^@\s]+@[^@\s]+$")?,
            )
        })
        .and_then(|s| s.add_decimal("amount", None))
        .and_then(|s| s.add_datetime("created", None))
        .expect("benchmark schema is valid");
    schema
}

fn bench_tokenizer(c: &mut Criterion) {
    let tokenizer = LineTokenizer::new(',', '"').with_trim(true);
    let plain = "1,Customer,user@example.com,12.50,2024-01-01 10:00:00";
    let quoted = "1,\"Customer, \"\"The\"\" Ltd\",user@example.com,\"12,50\",2024-01-01";

    let mut group = c.benchmark_group("tokenizer");
    group.bench_function("plain_line", |b| {
        b.iter(|| tokenizer.tokenize(black_box(plain)))
    });
    group.bench_function("quoted_line", |b| {
        b.iter(|| tokenizer.tokenize(black_box(quoted)))
    });
    group.finish();
}

fn bench_sniffing(c: &mut Criterion) {
    let text = sample_text(100);
    let sniffer = EncodingSniffer::new();

    let mut group = c.benchmark_group("sniffing");
    group.bench_function("delimiter", |b| {
        b.iter(|| detect_delimiter(black_box(&text), 5))
    });
    group.bench_function("encoding", |b| {
        b.iter(|| sniffer.detect(black_box(text.as_bytes())))
    });
    group.finish();
}

fn bench_parse_text(c: &mut Criterion) {
    let engine = ParsingEngine::new(ParsingOptions::default()).unwrap();
    let schema = customer_schema();

    let mut group = c.benchmark_group("parse_text");
    group.measurement_time(Duration::from_secs(10));

    for rows in [100, 1_000, 10_000] {
        let text = sample_text(rows);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("no_schema", rows), &text, |b, text| {
            b.iter(|| engine.parse_text(black_box(text), None).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("with_schema", rows), &text, |b, text| {
            b.iter(|| engine.parse_text(black_box(text), Some(&schema)).unwrap())
        });
    }
    group.finish();
}

fn bench_reader(c: &mut Criterion) {
    let text = sample_text(1_000);

    let mut group = c.benchmark_group("rows_from_reader");
    group.throughput(Throughput::Bytes(text.len() as u64));
    for buffer_size in [256, 4096, 65536] {
        let engine =
            ParsingEngine::new(ParsingOptions::default().with_buffer_size(buffer_size)).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(buffer_size),
            &text,
            |b, text| {
                b.iter(|| {
                    engine
                        .rows_from_reader(black_box(text.as_bytes()), None, TextEncoding::Utf8)
                        .count()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_tokenizer,
    bench_sniffing,
    bench_parse_text,
    bench_reader
);
criterion_main!(benches);
