use std::hint::black_box;
use std::time::Instant;

use lightbox_scene::{SceneGraph, create_box_grid};

fn bench_build(count: u32, iterations: usize) {
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(create_box_grid(black_box(count), black_box(1.5)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  build ({count}x{count} boxes, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_insert(count: u32, iterations: usize) {
    let grid = create_box_grid(count, 1.5);
    let start = Instant::now();
    for _ in 0..iterations {
        let mut graph = SceneGraph::new();
        graph.add(black_box(grid.clone()));
        black_box(graph.node_count());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  insert ({count}x{count} boxes, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_world_positions(count: u32, iterations: usize) {
    let mut graph = SceneGraph::new();
    graph.add(create_box_grid(count, 1.5));
    let ids = graph.traverse();

    let start = Instant::now();
    for _ in 0..iterations {
        for id in &ids {
            black_box(graph.world_position(black_box(*id)));
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  world positions ({} nodes, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}",
        ids.len()
    );
}

fn main() {
    println!("box grid benchmarks");
    for count in [10, 50, 100] {
        bench_build(count, 100);
        bench_insert(count, 100);
        bench_world_positions(count, 100);
    }
}
