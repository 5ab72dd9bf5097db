use luxagg_core::mocks::ScriptedSensor;
use luxagg_core::stats::SEED_GUESS;
use luxagg_core::{
    Band, CoreError, Cycle, CycleEvent, CyclePhase, CycleResult, SensorLimits, SqrtOutcome,
    Thresholds,
};

fn started(sensor: ScriptedSensor) -> Cycle<ScriptedSensor> {
    let mut c = Cycle::builder().with_sensor(sensor).build().unwrap();
    c.begin().unwrap();
    c
}

/// Step until a window is reduced; panics if that takes more than `max` ticks.
fn next_result(c: &mut Cycle<ScriptedSensor>, max: usize) -> CycleResult {
    for _ in 0..max {
        if let CycleEvent::Reduced(r) = c.step().unwrap() {
            return r;
        }
    }
    panic!("no reduction within {max} ticks");
}

fn alternating(lo: f32, hi: f32) -> Vec<f32> {
    (0..12).map(|i| if i % 2 == 0 { lo } else { hi }).collect()
}

#[test]
fn constant_ten_collapses_to_ten() {
    let mut c = started(ScriptedSensor::repeating(10.0));
    let r = next_result(&mut c, 13);
    assert_eq!(r.stats.variance, 0.0);
    assert_eq!(r.std_dev(), 0.0);
    assert_eq!(r.band(), Band::Collapse);
    assert_eq!(r.reduced(), &[10.0]);
    assert_eq!(r.readings, [10.0; 12]);
}

#[test]
fn full_cycle_takes_thirteen_ticks() {
    let mut c = started(ScriptedSensor::repeating(5.0));
    let mut ticks = 0;
    loop {
        ticks += 1;
        if matches!(c.step().unwrap(), CycleEvent::Reduced(_)) {
            break;
        }
    }
    assert_eq!(ticks, 13);
    // the sensor is read only on sampling ticks
    assert_eq!(c.sensor().reads(), 12);
}

#[test]
fn ascending_window_with_narrow_bands_groups_by_four() {
    let mut c = Cycle::builder()
        .with_sensor(ScriptedSensor::cycle_through(
            (1..=12).map(|v| v as f32).collect(),
        ))
        .with_thresholds(Thresholds {
            collapse_max: 1.0,
            passthrough_min: 5.0,
        })
        .build()
        .unwrap();
    c.begin().unwrap();
    let r = next_result(&mut c, 13);
    assert!(r.std_dev() > 1.0 && r.std_dev() < 5.0);
    assert_eq!(r.band(), Band::GroupOfFour);
    assert_eq!(r.reduced(), &[2.5, 6.5, 10.5]);
}

#[test]
fn medium_dispersion_groups_by_four() {
    let mut c = started(ScriptedSensor::cycle_through(alternating(20.0, 80.0)));
    let r = next_result(&mut c, 13);
    assert!((r.std_dev() - 30.0).abs() < 1e-3);
    assert_eq!(r.band(), Band::GroupOfFour);
    assert_eq!(r.reduced(), &[50.0, 50.0, 50.0]);
}

#[test]
fn high_dispersion_passes_through() {
    let values = alternating(0.0, 100.0);
    let mut c = started(ScriptedSensor::cycle_through(values.clone()));
    let r = next_result(&mut c, 13);
    assert_eq!(r.band(), Band::Passthrough);
    let expected: Vec<f64> = values.iter().map(|&v| f64::from(v)).collect();
    assert_eq!(r.reduced(), expected.as_slice());
}

#[test]
fn std_dev_carries_into_next_guess() {
    let mut c = started(ScriptedSensor::cycle_through(alternating(20.0, 80.0)));
    assert_eq!(c.guess(), SEED_GUESS);
    let first = next_result(&mut c, 13);
    assert_eq!(c.guess(), first.std_dev());
    let second = next_result(&mut c, 13);
    assert_eq!(second.sequence, 2);
    assert!(second.stats.sqrt.iterations() <= first.stats.sqrt.iterations());
}

#[test]
fn unconverged_estimate_does_not_seed_next_window() {
    let mut values = alternating(0.0, 1e30);
    values.extend(alternating(0.0, 20.0));
    let mut c = Cycle::builder()
        .with_sensor(ScriptedSensor::once(values))
        .with_ceiling(1e30)
        .build()
        .unwrap();
    c.begin().unwrap();

    let first = next_result(&mut c, 13);
    assert!(matches!(first.stats.sqrt, SqrtOutcome::BudgetExhausted { .. }));
    assert_eq!(c.guess(), SEED_GUESS);

    // variance 100 from the seed converges to 10
    let second = next_result(&mut c, 13);
    assert!(matches!(second.stats.sqrt, SqrtOutcome::Converged { .. }));
    assert!((second.std_dev() - 10.0).abs() < 1e-3);
    assert_eq!(second.band(), Band::Collapse);
    assert_eq!(second.reduced(), &[10.0]);
}

#[test]
fn window_is_clean_after_each_cycle() {
    let mut c = started(ScriptedSensor::cycle_through(
        (0..13).map(|v| v as f32).collect(),
    ));
    next_result(&mut c, 13);
    assert!(c.window().is_empty());
    assert_eq!(c.window().sum(), 0.0);
    // 13th script value is the first reading of the next window
    let CycleEvent::Sampled { reading, count, .. } = c.step().unwrap() else {
        panic!("expected a sample");
    };
    assert_eq!((reading, count), (12.0, 1));
    assert_eq!(c.window().sum(), 12.0);
}

#[test]
fn readings_above_ceiling_are_clamped() {
    let mut c = Cycle::builder()
        .with_sensor(ScriptedSensor::cycle_through(vec![200.0, -3.0, 42.0]))
        .with_limits(SensorLimits::default())
        .build()
        .unwrap();
    c.begin().unwrap();
    let events: Vec<CycleEvent> = (0..3).map(|_| c.step().unwrap()).collect();
    assert_eq!(
        events,
        vec![
            CycleEvent::Sampled {
                reading: 150.0,
                count: 1,
                clamped: true
            },
            CycleEvent::Sampled {
                reading: 0.0,
                count: 2,
                clamped: true
            },
            CycleEvent::Sampled {
                reading: 42.0,
                count: 3,
                clamped: false
            },
        ]
    );
}

#[test]
fn failed_and_invalid_reads_consume_the_tick() {
    let script = vec![Some(1.0), None, Some(f32::NAN), Some(2.0)];
    let mut c = started(ScriptedSensor::with_failures(script, true));
    assert!(matches!(c.step().unwrap(), CycleEvent::Sampled { count: 1, .. }));
    assert!(matches!(
        c.step().unwrap(),
        CycleEvent::Rejected(CoreError::Sensor(_))
    ));
    assert!(matches!(
        c.step().unwrap(),
        CycleEvent::Rejected(CoreError::InvalidReading(_))
    ));
    assert!(matches!(c.step().unwrap(), CycleEvent::Sampled { count: 2, .. }));
    assert_eq!(c.window().readings(), &[1.0, 2.0]);
    assert_eq!(c.phase(), CyclePhase::Filling);
}

#[test]
fn exhausted_source_is_reported_not_raised() {
    let mut c = started(ScriptedSensor::once(vec![1.0]));
    c.step().unwrap();
    assert_eq!(
        c.step().unwrap(),
        CycleEvent::Rejected(CoreError::SourceExhausted)
    );
}

#[test]
fn begin_activates_sensor_once() {
    let mut c = started(ScriptedSensor::repeating(1.0));
    c.step().unwrap();
    c.begin().unwrap();
    assert_eq!(c.sensor().activations(), 1);
    assert!(c.window().is_empty());
    assert!(c.is_started());
}

#[test]
fn activation_failure_surfaces_from_begin() {
    let mut c = Cycle::builder()
        .with_sensor(ScriptedSensor::repeating(1.0).failing_activation())
        .build()
        .unwrap();
    let err = c.begin().unwrap_err();
    assert!(format!("{err:#}").contains("activate light sensor"));
    assert!(!c.is_started());
}

#[test]
fn recover_discards_partial_window() {
    let mut c = started(ScriptedSensor::repeating(3.0));
    for _ in 0..5 {
        c.step().unwrap();
    }
    c.recover();
    assert!(c.window().is_empty());
    assert_eq!(c.phase(), CyclePhase::Filling);
}
