//! Session benchmarks for skirmish_core.
//!
//! Run with: `cargo bench -p skirmish_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skirmish_core::config::SessionConfig;
use skirmish_core::map::BattleMap;
use skirmish_core::math::GridPos;
use skirmish_core::objective::MissionKind;
use skirmish_core::pathfinding::find_path;
use skirmish_core::session::Session;
use std::collections::HashSet;

/// Full battles, one per mission.
pub fn session_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("play_out");
    for mission in MissionKind::ALL {
        let config = SessionConfig::new(3).with_seed(42).with_mission(mission.as_str());
        group.bench_with_input(BenchmarkId::from_parameter(mission), &config, |b, config| {
            b.iter(|| {
                let session = Session::new(black_box(config)).expect("valid config");
                black_box(session.play_out())
            });
        });
    }
    group.finish();
}

/// Corner-to-corner search on the largest preset layout.
pub fn pathfinding_benchmark(c: &mut Criterion) {
    let map = BattleMap::from_preset(32, 32, &skirmish_core::map::PRESETS[3]);
    let blocked = HashSet::new();
    c.bench_function("find_path_32x32", |b| {
        b.iter(|| {
            find_path(
                black_box(&map),
                GridPos::new(0, 0),
                GridPos::new(31, 31),
                &blocked,
            )
        });
    });
}

criterion_group!(benches, session_benchmark, pathfinding_benchmark);
criterion_main!(benches);
