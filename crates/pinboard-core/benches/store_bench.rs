//! Criterion benchmarks for [`LayoutStore`] hot-path operations.
//!
//! The store sits on the drag/resize path of the board UI: every pointer-up
//! lands a patch and every card click raises a z-order, so both operations
//! must stay comfortably inside a frame budget even on large boards.
//!
//! Run with:
//! ```bash
//! cargo bench --package pinboard-core --bench store_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Map};

use pinboard_core::{LayoutItem, LayoutStore};

// ── Board fixture builders ────────────────────────────────────────────────────

/// Creates a store holding `n` items laid out on a grid, z = index.
fn build_board_with_n_items(n: usize) -> LayoutStore {
    let items: Vec<LayoutItem> = (0..n)
        .map(|i| LayoutItem {
            id: format!("item-{}", i),
            x: (i % 10) as f64 * 340.0,
            y: (i / 10) as f64 * 200.0,
            z: i as i64,
            width: 320.0,
            height: 180.0,
            size_key: "medium".to_string(),
            display_mode: "card".to_string(),
            extra: Map::new(),
        })
        .collect();

    let mut store = LayoutStore::new();
    store.set_items(items);
    store
}

fn move_patch() -> Map<String, serde_json::Value> {
    json!({ "x": 512.0, "y": 256.0 })
        .as_object()
        .cloned()
        .expect("literal is an object")
}

// ── Benchmarks: bring_to_front ────────────────────────────────────────────────

/// Benchmarks [`LayoutStore::bring_to_front`] raising the bottom item
/// (worst case: the copy actually happens).
fn bench_bring_to_front(c: &mut Criterion) {
    let mut group = c.benchmark_group("bring_to_front");

    // Alternate two items so every iteration performs a real raise rather
    // than degenerating into the no-op path after the first call.
    group.bench_function("raise_alternating_of_32", |b| {
        let mut store = build_board_with_n_items(32);
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            store.bring_to_front(black_box(if flip { "item-0" } else { "item-1" }))
        })
    });

    // The already-front item is the no-op hot path: a scan, no copy.
    group.bench_function("noop_front_of_32", |b| {
        let mut store = build_board_with_n_items(32);
        store.bring_to_front("item-0");
        b.iter(|| store.bring_to_front(black_box("item-0")))
    });

    group.finish();
}

// ── Benchmarks: update_layout ─────────────────────────────────────────────────

/// Benchmarks [`LayoutStore::update_layout`] applying a move patch.
fn bench_update_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_layout");
    let patch = move_patch();

    group.bench_function("move_patch_on_32", |b| {
        let mut store = build_board_with_n_items(32);
        b.iter(|| store.update_layout(black_box("item-16"), black_box(&patch)))
    });

    group.finish();
}

/// Benchmarks [`LayoutStore::update_layout`] scaling with board size.
fn bench_update_layout_scaling(c: &mut Criterion) {
    let item_counts = [8usize, 32, 128, 512];
    let mut group = c.benchmark_group("update_layout_scaling");
    let patch = move_patch();

    for &count in &item_counts {
        let mut store = build_board_with_n_items(count);
        // Last item is the worst case for the linear id scan.
        let target = format!("item-{}", count - 1);

        group.bench_with_input(BenchmarkId::new("items", count), &target, |b, target| {
            b.iter(|| store.update_layout(black_box(target), black_box(&patch)))
        });
    }

    group.finish();
}

// ── Benchmarks: snapshot ──────────────────────────────────────────────────────

/// Benchmarks [`LayoutStore::snapshot`] — an `Arc` clone, taken once per
/// debounce fire regardless of board size.
fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for &count in &[32usize, 512] {
        let store = build_board_with_n_items(count);
        group.bench_with_input(BenchmarkId::new("items", count), &store, |b, store| {
            b.iter(|| black_box(store.snapshot()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_bring_to_front,
    bench_update_layout,
    bench_update_layout_scaling,
    bench_snapshot,
);
criterion_main!(benches);
