//! Performance benchmarks for bsm_core using Criterion.rs.

use std::collections::BTreeSet;

use bsm_core::bsm::evaluate;
use bsm_core::clock::ManualClock;
use bsm_core::road::{LaneProfile, RoadCategory};
use bsm_core::segment::{RouteSegment, SegmentTable};
use bsm_core::simulator::{DriverInputs, RouteSimulator};
use bsm_core::speed::Speed;
use bsm_core::test_helpers::meridian_route;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_evaluate(c: &mut Criterion) {
    let features: BTreeSet<String> = ["LKA", "AEB"].iter().map(|s| s.to_string()).collect();
    c.bench_function("evaluate_prompt", |b| {
        b.iter(|| {
            evaluate(
                black_box(72.0),
                black_box("motorway"),
                black_box(3),
                black_box(true),
                &features,
            )
        })
    });
}

fn bench_segment_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_lookup");
    for count in [10usize, 100, 1_000] {
        let segments = (0..count)
            .map(|i| RouteSegment {
                start_index: i * 10,
                end_index: i * 10 + 10,
                road_category: RoadCategory::ALL[i % RoadCategory::ALL.len()],
            })
            .collect();
        let table = SegmentTable::new(segments, count * 10);
        group.bench_with_input(BenchmarkId::from_parameter(count), &table, |b, table| {
            b.iter(|| table.segment_for(black_box(count * 10 - 1)).road_category)
        });
    }
    group.finish();
}

fn bench_full_drive(c: &mut Criterion) {
    let route = meridian_route(
        500,
        0.2,
        &[(200, RoadCategory::Primary), (400, RoadCategory::Motorway)],
    );
    let speed = Speed::from_kmph(90.0).expect("valid speed");
    let inputs = DriverInputs::new(speed, ["ACC"]);

    c.bench_function("drive_500_points", |b| {
        b.iter(|| {
            let clock = ManualClock::new(0);
            let mut sim = RouteSimulator::new(route.clone(), LaneProfile::default(), clock.clone());
            while !sim.is_arrived() {
                clock.advance_secs(10);
                black_box(sim.tick(&inputs));
            }
        })
    });
}

criterion_group!(benches, bench_evaluate, bench_segment_lookup, bench_full_drive);
criterion_main!(benches);
