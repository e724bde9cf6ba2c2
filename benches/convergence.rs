#![allow(missing_docs)]

//! Benchmarks for the convergence checks run on every complete observation.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kibitzer::domain::models::{DynamicPv, Evaluation, Position, Score, TaskId, UciState, Variation};
use kibitzer::services::convergence::{determine_number_of_good_pv, is_stable_snapshot, should_stop_early};
use std::time::Duration;

fn evaluation(pv_count: u32) -> Evaluation {
    let position = Position::new("", "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3", 4, true);
    let variations = (1..=pv_count)
        .map(|pv_id| Variation {
            pv_id,
            moves: format!("e4 e5 Nf3 line{pv_id}"),
            score: Score::Centipawns(40 - i32::try_from(pv_id).unwrap_or(0) * 15),
            depth: 30,
            time: Duration::from_secs(3),
            position: position.clone(),
        })
        .collect();
    Evaluation {
        task_id: TaskId::new("bench"),
        created: Utc::now(),
        variations,
        uci_state: UciState::default(),
    }
}

fn convergence_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("convergence");
    let policy = DynamicPv {
        required_depth: 20,
        cut_off_centi_pawns: 30,
        keep_min_pv: 2,
    };

    for pv_count in [1_u32, 5, 50] {
        let snapshot = evaluation(pv_count);

        group.bench_function(format!("good_pv_{pv_count}"), |b| {
            b.iter(|| determine_number_of_good_pv(black_box(&snapshot.variations), 30));
        });
        group.bench_function(format!("stable_snapshot_{pv_count}"), |b| {
            b.iter(|| is_stable_snapshot(black_box(&snapshot), pv_count));
        });
        group.bench_function(format!("should_stop_early_{pv_count}"), |b| {
            b.iter(|| should_stop_early(black_box(&snapshot), &policy));
        });
    }

    group.finish();
}

criterion_group!(benches, convergence_benchmark);
criterion_main!(benches);
