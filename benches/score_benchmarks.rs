use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::BTreeMap;

use recoverrs::baseline::{BaselineStats, BaselineWindow};
use recoverrs::models::DailyRecord;
use recoverrs::score::RecoveryCalculator;

/// Performance benchmarks for recovery score computation
///
/// The dominant cost is the baseline pass (a sort per window), so the
/// benchmarks vary the trailing-window size.

fn create_history(days: u32) -> (NaiveDate, BTreeMap<NaiveDate, DailyRecord>) {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let mut history = BTreeMap::new();

    for i in 0..days {
        let date = start.checked_add_days(Days::new(u64::from(i))).unwrap();
        let hrv = 40.0 + f64::from(i % 21);
        let load = 400.0 + 30.0 * f64::from(i % 37);
        history.insert(date, DailyRecord::new("athlete_1", date, 7.2, hrv, 58.0, load));
    }

    let target = start
        .checked_add_days(Days::new(u64::from(days) - 1))
        .unwrap();
    (target, history)
}

fn bench_score_computation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Recovery Score");

    for &days in &[7, 30, 90, 365] {
        let (target, history) = create_history(days);
        let calculator = RecoveryCalculator::with_window(BaselineWindow {
            days,
            include_target: true,
        });

        group.throughput(Throughput::Elements(u64::from(days)));
        group.bench_with_input(
            BenchmarkId::new("compute", days),
            &history,
            |b, history| {
                b.iter(|| calculator.compute(black_box(target), history));
            },
        );
    }

    group.finish();
}

fn bench_baseline_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("Baseline Statistics");

    for &days in &[30, 365] {
        let (target, history) = create_history(days);
        let window = BaselineWindow {
            days,
            include_target: true,
        };

        group.throughput(Throughput::Elements(u64::from(days)));
        group.bench_with_input(
            BenchmarkId::new("from_history", days),
            &history,
            |b, history| {
                b.iter(|| BaselineStats::from_history(history, black_box(target), &window));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_score_computation, bench_baseline_stats);
criterion_main!(benches);
