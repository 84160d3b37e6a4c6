//! Performance benchmarks for arcview
//!
//! Run with: cargo bench

use arcview::highlight::render_content;
use arcview::index::build::{build_archive, BuildOptions};
use arcview::index::StoreHandle;
use arcview::query::{QueryEvaluator, SearchMode};
use arcview::router::Location;
use arcview::session::{Session, SessionOptions};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const TOPICS: &[&str] = &["caching", "lifetimes", "channels", "parsing", "tokio", "serde"];

fn transcript(i: usize) -> String {
    let topic = TOPICS[i % TOPICS.len()];
    let mut content = String::new();
    for turn in 0..(2 + i % 6) {
        content.push_str(&format!(
            "## PROMPT ##\nQuestion {turn} about {topic} in project {i}?\n\n\
             ## RESPONSE ##\nAn answer on {topic}: use <T> & keep {topic} simple. Caching helps {i}.\n\n"
        ));
    }
    content
}

/// Build an archive of generated transcripts
fn create_benchmark_archive() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let chats = temp_dir.path().join("chats");
    let out = temp_dir.path().join("public");
    fs::create_dir_all(&chats).expect("Failed to create chats dir");

    for i in 0..500 {
        fs::write(chats.join(format!("chat_{i:04}.txt")), transcript(i))
            .expect("Failed to write chat");
    }

    let options = BuildOptions {
        silent: true,
        ..BuildOptions::default()
    };
    build_archive(&chats, &out, &options).expect("Failed to build archive");

    (temp_dir, out)
}

fn bench_archive_open(c: &mut Criterion) {
    let (_temp_dir, archive) = create_benchmark_archive();

    c.bench_function("archive_open", |b| {
        b.iter(|| StoreHandle::open(black_box(&archive)))
    });
}

fn bench_evaluation(c: &mut Criterion) {
    let (_temp_dir, archive) = create_benchmark_archive();
    let store = StoreHandle::open(&archive).expect("Failed to open archive");
    let evaluator = QueryEvaluator::new(&store);

    let mut group = c.benchmark_group("evaluation");
    for query in ["caching", "caching project", "tokio serde", "missing"] {
        group.bench_with_input(BenchmarkId::new("token", query), &query, |b, &q| {
            b.iter(|| evaluator.evaluate(black_box(q), SearchMode::Token))
        });
    }
    for query in ["cach", "project 42", "keep serde simple"] {
        group.bench_with_input(BenchmarkId::new("substring", query), &query, |b, &q| {
            b.iter(|| evaluator.evaluate(black_box(q), SearchMode::Substring))
        });
    }
    group.finish();
}

fn bench_highlighting(c: &mut Criterion) {
    let small = transcript(5);
    let large = transcript(5).repeat(50);

    let mut group = c.benchmark_group("highlight");
    group.bench_function("small", |b| {
        b.iter(|| render_content(black_box(&small), Some("caching")))
    });
    group.bench_function("large", |b| {
        b.iter(|| render_content(black_box(&large), Some("caching")))
    });
    group.bench_function("large_html", |b| {
        let rendered = render_content(&large, Some("caching"));
        b.iter(|| {
            rendered
                .blocks
                .iter()
                .map(|block| block.to_html().len())
                .sum::<usize>()
        })
    });
    group.finish();
}

fn bench_session_render(c: &mut Criterion) {
    let (_temp_dir, archive) = create_benchmark_archive();
    let store = StoreHandle::open(&archive).expect("Failed to open archive");

    let mut group = c.benchmark_group("session");
    for fragment in ["#/", "#/?q=caching", "#/chat/6?q=caching"] {
        group.bench_with_input(BenchmarkId::from_parameter(fragment), &fragment, |b, &f| {
            b.iter(|| {
                Session::new(&store, Location::parse(black_box(f)), SessionOptions::default())
                    .render()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_archive_open,
    bench_evaluation,
    bench_highlighting,
    bench_session_render,
);

criterion_main!(benches);
