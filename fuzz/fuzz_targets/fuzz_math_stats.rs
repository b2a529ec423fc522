#![no_main]

use libfuzzer_sys::fuzz_target;
use tally_math::{gini_coefficient, max_share, pct_change, percentile, safe_ratio};

const MAX_INPUT_SIZE: usize = 16 * 1024;

fn read_u32(bytes: &[u8]) -> u32 {
    let mut arr = [0u8; 4];
    let len = bytes.len().min(4);
    arr[..len].copy_from_slice(&bytes[..len]);
    u32::from_le_bytes(arr)
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() || data.len() > MAX_INPUT_SIZE {
        return;
    }

    let numer = read_u32(data.get(1..5).unwrap_or(&[])) as usize;
    let denom = read_u32(data.get(5..9).unwrap_or(&[])) as usize;

    if denom == 0 {
        assert_eq!(safe_ratio(numer, denom), 0.0);
    }
    if numer > 0 {
        assert_eq!(safe_ratio(numer, numer), 1.0);
        assert_eq!(pct_change(numer, numer), Some(0.0));
    }
    match pct_change(denom, numer) {
        None => assert!(denom == 0 && numer != 0),
        Some(p) => assert!(p.is_finite() && p >= -1.0),
    }

    let mut values: Vec<usize> = data
        .get(9..)
        .unwrap_or(&[])
        .iter()
        .map(|b| *b as usize)
        .collect();
    if values.is_empty() {
        values.push(0);
    }
    values.sort_unstable();

    let pct = (data[0] as f64) / 255.0;
    let p = percentile(&values, pct);
    assert!(p >= values[0] as f64);
    assert!(p <= values[values.len() - 1] as f64);

    let gini = gini_coefficient(&values);
    assert!((0.0..=1.0).contains(&gini), "gini out of range: {gini}");

    let share = max_share(&values);
    assert!((0.0..=1.0).contains(&share), "share out of range: {share}");
});
