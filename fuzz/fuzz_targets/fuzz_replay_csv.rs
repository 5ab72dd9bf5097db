#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);
    if let Ok(values) = luxagg_config::read_replay(rdr) {
        assert!(values.iter().all(|v| v.is_finite()));
    }
});
