use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use relative_layout_rs::config::Config;
use relative_layout_rs::layout::{Axis, MeasureSpec};
use relative_layout_rs::layout_source;
use relative_layout_rs::parser::parse_scene;
use std::hint::black_box;

/// A single row of boxes, each to the right of the previous one.
fn chain_source(boxes: usize) -> String {
    let mut out = String::from("relative\n");
    for i in 0..boxes {
        if i == 0 {
            out.push_str("box n0 content=40x20 alignParentLeft\n");
        } else {
            out.push_str(&format!("box n{} content=40x20 rightOf=n{}\n", i, i - 1));
        }
    }
    out
}

/// `rows` x `cols` grid where every cell hangs off its left and upper neighbors.
fn grid_source(rows: usize, cols: usize) -> String {
    let mut out = String::from("relative\npadding 4\n");
    for r in 0..rows {
        for c in 0..cols {
            out.push_str(&format!("box c{}_{} content=30x12 margin=2", r, c));
            if c > 0 {
                out.push_str(&format!(" rightOf=c{}_{}", r, c - 1));
            }
            if r > 0 {
                out.push_str(&format!(" below=c{}_{}", r - 1, c));
            }
            if (r + c) % 7 == 3 {
                out.push_str(" visibility=gone");
            }
            out.push('\n');
        }
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (rows, cols) in [(4usize, 4usize), (16, 16), (32, 32)] {
        let input = grid_source(rows, cols);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("grid_{}x{}", rows, cols)),
            &input,
            |b, data| {
                b.iter(|| {
                    let parsed = parse_scene(black_box(data)).expect("parse failed");
                    black_box(parsed.scene.boxes.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");
    let config = Config::default();
    for boxes in [16usize, 256, 1024] {
        let parsed = parse_scene(&chain_source(boxes)).expect("parse failed");
        let mut layout = parsed.scene.into_layout(&config.container);
        layout
            .measure(config.measure.width_spec(), config.measure.height_spec())
            .expect("measure failed");
        group.bench_with_input(BenchmarkId::new("chain", boxes), &boxes, |b, _| {
            b.iter(|| {
                // dropping the cached orderings forces a re-sort on the next measure
                layout.invalidate();
                layout
                    .measure(MeasureSpec::exactly(1080), MeasureSpec::unspecified())
                    .expect("measure failed");
                black_box(layout.sorted_children(Axis::Horizontal).len());
            });
        });
    }
    group.finish();
}

fn bench_measure(c: &mut Criterion) {
    let mut group = c.benchmark_group("measure");
    let config = Config::default();
    for (rows, cols) in [(4usize, 4usize), (16, 16), (32, 32)] {
        let parsed = parse_scene(&grid_source(rows, cols)).expect("parse failed");
        let mut layout = parsed.scene.into_layout(&config.container);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("grid_{}x{}", rows, cols)),
            &(rows, cols),
            |b, _| {
                b.iter(|| {
                    let size = layout
                        .measure(
                            black_box(MeasureSpec::at_most(4096)),
                            black_box(MeasureSpec::unspecified()),
                        )
                        .expect("measure failed");
                    black_box(size);
                });
            },
        );
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let config = Config::default();
    for boxes in [16usize, 256] {
        let input = chain_source(boxes);
        group.bench_with_input(BenchmarkId::new("chain", boxes), &input, |b, data| {
            b.iter(|| {
                let dump = layout_source(black_box(data), &config).expect("layout failed");
                black_box(dump.boxes.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_parse, bench_sort, bench_measure, bench_end_to_end
);
criterion_main!(benches);
