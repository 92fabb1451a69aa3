//! Property tests for the recovery score invariants.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use std::collections::BTreeMap;

use recoverrs::models::DailyRecord;
use recoverrs::score::{hrv_score, load_score, sleep_score, RecoveryCalculator};

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .checked_add_days(Days::new(u64::from(n)))
        .unwrap()
}

/// History generator: 10-40 days of plausible samples, plus an arbitrary
/// (and possibly extreme) target day appended at the end.
fn arbitrary_history() -> impl Strategy<Value = (NaiveDate, BTreeMap<NaiveDate, DailyRecord>)> {
    (
        prop::collection::vec((1.0f64..120.0, 50.0f64..2000.0), 10..40),
        0.0f64..24.0,
        0.0f64..300.0,
        0.0f64..5000.0,
    )
        .prop_map(|(window, target_sleep, target_hrv, target_load)| {
            let mut history = BTreeMap::new();
            for (i, (hrv, load)) in window.iter().enumerate() {
                let date = day(i as u32);
                history.insert(
                    date,
                    DailyRecord::new("athlete_1", date, 7.0, *hrv, 60.0, *load),
                );
            }
            let target = day(window.len() as u32);
            history.insert(
                target,
                DailyRecord::new(
                    "athlete_1",
                    target,
                    target_sleep,
                    target_hrv,
                    60.0,
                    target_load,
                ),
            );
            (target, history)
        })
}

proptest! {
    #[test]
    fn score_stays_within_bounds((target, history) in arbitrary_history()) {
        let score = RecoveryCalculator::new()
            .compute(target, &history)
            .unwrap();

        prop_assert!(score >= 0.0, "score {} below 0", score);
        prop_assert!(score <= 100.0, "score {} above 100", score);
    }

    #[test]
    fn score_is_deterministic((target, history) in arbitrary_history()) {
        let calculator = RecoveryCalculator::new();

        let first = calculator.compute(target, &history).unwrap();
        let second = calculator.compute(target, &history).unwrap();

        prop_assert_eq!(first, second);
    }

    #[test]
    fn sleep_score_is_monotonic(a in 0.0f64..24.0, b in 0.0f64..24.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(sleep_score(lo) <= sleep_score(hi));
    }

    #[test]
    fn hrv_score_never_exceeds_one(current in 0.0f64..500.0, median in 1.0f64..200.0) {
        let score = hrv_score(current, median).unwrap();
        prop_assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn load_score_is_inverse_monotonic(
        a in 0.0f64..5000.0,
        b in 0.0f64..5000.0,
        p75 in 1.0f64..2000.0,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lighter = load_score(lo, p75).unwrap();
        let heavier = load_score(hi, p75).unwrap();
        prop_assert!(lighter >= heavier);
    }
}
