use luxagg_core::stats::{
    MAX_SQRT_ITERATIONS, SEED_GUESS, SQRT_TOLERANCE, SqrtOutcome, Statistics, babylonian_sqrt,
};
use luxagg_core::{WINDOW_CAPACITY, Window};
use proptest::prelude::*;
use rstest::rstest;

fn full_window(readings: &[f32; WINDOW_CAPACITY]) -> Window {
    let mut w = Window::new();
    for &r in readings {
        w.append(r).unwrap();
    }
    w
}

proptest! {
    #[test]
    fn mean_is_sum_over_twelve(readings in prop::array::uniform12(0.0f32..150.0)) {
        let w = full_window(&readings);
        let st = Statistics::from_window(&w, SEED_GUESS).unwrap();
        let expected: f64 = readings.iter().map(|&r| f64::from(r)).sum::<f64>() / 12.0;
        prop_assert!((st.mean - expected).abs() < 1e-6);
    }

    #[test]
    fn sqrt_meets_tolerance_or_spends_budget(v in 1e-6f64..1e6, guess in 0.01f64..200.0) {
        let (s, outcome) = babylonian_sqrt(v, guess);
        match outcome {
            SqrtOutcome::Converged { iterations } => {
                prop_assert!((s * s - v).abs() < SQRT_TOLERANCE);
                prop_assert!(iterations >= 1 && iterations <= MAX_SQRT_ITERATIONS);
            }
            SqrtOutcome::BudgetExhausted { iterations } => {
                prop_assert_eq!(iterations, MAX_SQRT_ITERATIONS);
            }
            SqrtOutcome::Degenerate => prop_assert!(false, "positive variance marked degenerate"),
        }
    }

    #[test]
    fn window_statistics_match_direct_computation(readings in prop::array::uniform12(0.0f32..150.0)) {
        let from_window = Statistics::from_window(&full_window(&readings), SEED_GUESS).unwrap();
        let direct = Statistics::from_readings(&readings, SEED_GUESS);
        prop_assert!((from_window.mean - direct.mean).abs() < 1e-9);
        prop_assert!((from_window.variance - direct.variance).abs() < 1e-9);
        prop_assert!(from_window.variance >= 0.0);
    }
}

#[rstest]
#[case(0.0)]
#[case(10.0)]
#[case(42.5)]
#[case(150.0)]
fn constant_window_is_degenerate(#[case] c: f32) {
    let st = Statistics::from_readings(&[c; WINDOW_CAPACITY], SEED_GUESS);
    assert_eq!(st.mean, f64::from(c));
    assert_eq!(st.variance, 0.0);
    assert_eq!(st.std_dev, 0.0);
    assert_eq!(st.sqrt, SqrtOutcome::Degenerate);
}

#[test]
fn previous_std_dev_is_a_better_guess_than_seed() {
    let readings: [f32; 12] = std::array::from_fn(|i| if i % 2 == 0 { 0.0 } else { 100.0 });
    let cold = Statistics::from_readings(&readings, SEED_GUESS);
    let warm = Statistics::from_readings(&readings, cold.std_dev);
    assert!((cold.std_dev - 50.0).abs() < 1e-3);
    assert!(warm.sqrt.iterations() <= cold.sqrt.iterations());
}
