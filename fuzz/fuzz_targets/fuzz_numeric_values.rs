#![no_main]

use libfuzzer_sys::fuzz_target;
use rylv_statsd::format;

// Delta formatting must always produce a sign, at most three fraction digits and no
// trailing zeros
fuzz_target!(|data: [u8; 8]| {
    let value = f64::from_le_bytes(data);
    if !value.is_finite() {
        return;
    }

    let text = format::delta(value);
    assert!(text.starts_with('+') || text.starts_with('-'), "{text}");
    if let Some((_, fraction)) = text.split_once('.') {
        assert!(!fraction.is_empty() && fraction.len() <= 3, "{text}");
        assert!(!fraction.ends_with('0'), "{text}");
    }

    let parsed: f64 = text.parse().unwrap();
    assert!((parsed - value).abs() <= 0.0005 + value.abs() * 1e-14, "{value} -> {text}");

    let fixed = format::fixed(value);
    assert_eq!(fixed.split_once('.').map(|(_, f)| f.len()), Some(15));
});
