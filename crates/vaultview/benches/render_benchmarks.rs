//! Performance benchmarks for the render pipeline and render cache

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use vaultview_core::ConfigProfile;
use vaultview_parser::{NoLinks, render_markdown};
use vaultview_vault::VaultManager;

/// Note body touching every pipeline stage
fn sample_note(i: usize, num_notes: usize) -> String {
    format!(
        "---\ntitle: Note {i}\n---\n# Note {i}\n\nLinks to [[note{a}]] and [[note{b}|an alias]], \
         see https://example.com/{i}.\n\n## Tasks\n\n- [x] done\n- [ ] todo\n\n\
         | a | b |\n|---|---|\n| 1 | 2 |\n\n```rust\nfn main() {{\n    println!(\"{i}\");\n}}\n```\n\n\
         ```mermaid\ngraph TD; A-->B;\n```\n",
        i = i,
        a = (i + 1) % num_notes,
        b = (i + 2) % num_notes,
    )
}

async fn setup_bench_vault(num_notes: usize) -> (TempDir, VaultManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    for i in 0..num_notes {
        tokio::fs::write(
            temp_dir.path().join(format!("note{}.md", i)),
            sample_note(i, num_notes),
        )
        .await
        .expect("Failed to write note");
    }

    let mut config = ConfigProfile::Production.create_config();
    config.vault_path = temp_dir.path().to_path_buf();
    let manager = VaultManager::new(config);
    manager.warm_caches().await.expect("Failed to warm caches");

    (temp_dir, manager)
}

/// Full pipeline without any cache
fn bench_render_cold(c: &mut Criterion) {
    let source = sample_note(0, 10);

    c.bench_function("render_pipeline_cold", |b| {
        b.iter(|| render_markdown(black_box(&source), &NoLinks).unwrap())
    });
}

/// Facade renders: first miss then cache hits
fn bench_render_cached(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (_temp_dir, manager) = rt.block_on(setup_bench_vault(50));
    let source = sample_note(0, 50);
    rt.block_on(manager.render(&source, Some("note0"))).unwrap();

    c.bench_function("render_cached_hit", |b| {
        b.to_async(&rt).iter(|| async {
            manager
                .render(black_box(&source), black_box(Some("note0")))
                .await
                .unwrap()
        })
    });
}

/// Cold scans of vaults of increasing size
fn bench_scan(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("scan_and_index");

    for size in [10, 100, 500].iter() {
        let (_temp_dir, manager) = rt.block_on(setup_bench_vault(*size));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.to_async(&rt).iter(|| async {
                manager.invalidate_caches();
                manager.warm_caches().await.unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render_cold, bench_render_cached, bench_scan);
criterion_main!(benches);
