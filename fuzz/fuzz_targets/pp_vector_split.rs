#![no_main]

use libfuzzer_sys::fuzz_target;
use pp_core::NumericVector;

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let index = i64::from_le_bytes([
        data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
    ]) as isize;
    let values: Vec<f64> = data[8..]
        .chunks_exact(8)
        .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect();
    let len = values.len();

    // Non-finite input must be rejected, never panic.
    let Ok(vector) = NumericVector::new(values) else {
        return;
    };
    let (head, tail) = vector.split(index);
    assert_eq!(head.len() + tail.len(), len);
    assert_eq!(NumericVector::concatenate([&head, &tail]), vector);
});
