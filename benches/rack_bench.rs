//! Benchmarks for the control path.
//!
//! Run with: cargo bench
//!
//! Everything here runs on the UI thread between frames, so the budget is a
//! small slice of a 16ms frame.
//!
//! Benchmark groups:
//!   - patterns/*   Step edits and the gate view handed to sequencers
//!   - transport/*  Clock advance plus draining the lane queues

use std::{hint::black_box, time::Duration};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rebirth_rack::{
    config::RackConfig,
    engine::SoftEngine,
    sequencing::{StepMode, StepPattern},
    voices::Voice,
    Rack,
};

/// Pattern lengths worth measuring: one bar up to four
const STEP_COUNTS: &[usize] = &[16, 32, 64];

fn bench_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("patterns");

    for &steps in STEP_COUNTS {
        let pattern = StepPattern::bass_default(steps);
        group.bench_with_input(BenchmarkId::new("with_step", steps), &steps, |b, &n| {
            b.iter(|| black_box(pattern.with_step(black_box(n / 2), 0.7)))
        });

        let kick = StepPattern::kick_default(steps);
        group.bench_with_input(BenchmarkId::new("gate_view", steps), &kick, |b, p| {
            b.iter(|| black_box(StepMode::Gate.sequencer_steps(black_box(p))))
        });

        let mut engine = SoftEngine::new();
        let Ok(mut rack) = Rack::new(RackConfig::new().steps(steps), &mut engine) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("rack_toggle", steps), &steps, |b, &n| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % n;
                black_box(rack.toggle_step(Voice::Kick, i))
            })
        });
    }

    group.finish();
}

fn bench_transport(c: &mut Criterion) {
    let mut group = c.benchmark_group("transport");

    let mut engine = SoftEngine::new();
    if let Ok(mut rack) = Rack::new(RackConfig::new(), &mut engine) {
        rack.toggle_playback();

        // One 60fps frame of wall time per iteration
        group.bench_function("frame", |b| {
            b.iter(|| {
                engine.advance(Duration::from_millis(16));
                black_box(rack.poll())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_patterns, bench_transport);
criterion_main!(benches);
