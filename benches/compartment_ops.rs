//! Benchmarks for compartment set filtering and iteration.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use compartment_sets::compartment::{CompartmentLocation, CompartmentSet};
use compartment_sets::selection::Selection;

const LOCATIONS: u64 = 100_000;

fn large_set() -> CompartmentSet {
    let locations: Vec<CompartmentLocation> = (0..LOCATIONS)
        .map(|i| CompartmentLocation::new(i % 5_000, i % 97, (i % 11) as f64 / 10.0).unwrap())
        .collect();
    CompartmentSet::new("bench", locations)
}

fn every_third_node() -> Selection {
    Selection::from_values((0..5_000).step_by(3)).unwrap()
}

fn bench_size(c: &mut Criterion) {
    let set = large_set();
    let selection = every_third_node();

    c.bench_function("size_selected_100k", |bench| {
        bench.iter(|| black_box(set.size(&selection)))
    });
}

fn bench_filtered_iter(c: &mut Criterion) {
    let set = large_set();
    let selection = every_third_node();

    c.bench_function("filtered_iter_100k", |bench| {
        bench.iter(|| {
            black_box(
                set.filtered_iter(selection.clone())
                    .map(|loc| loc.section_index())
                    .sum::<u64>(),
            )
        })
    });
}

fn bench_filter(c: &mut Criterion) {
    let set = large_set();
    let selection = every_third_node();

    c.bench_function("filter_100k", |bench| {
        bench.iter(|| black_box(set.filter(&selection)))
    });
}

fn bench_parse(c: &mut Criterion) {
    let json = format!(r#"{{"big": {}}}"#, large_set().to_json());

    c.bench_function("parse_100k", |bench| {
        bench.iter(|| {
            black_box(
                json.parse::<compartment_sets::compartment::CompartmentSets>()
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_size, bench_filtered_iter, bench_filter, bench_parse);
criterion_main!(benches);
