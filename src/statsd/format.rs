//! Text formatting for metric values and sample rates.
//!
//! Integers use [`itoa`]. Absolute gauges use fixed point with
//! [`FIXED_FRACTION_DIGITS`] digits. Gauge deltas use the sign-forcing
//! `+#.###;-#.###;+0` layout so the server can tell an adjustment from an absolute set.

/// Fraction digits written for absolute gauge values.
pub const FIXED_FRACTION_DIGITS: usize = 15;

/// Maximum fraction digits written for gauge deltas.
pub const DELTA_FRACTION_DIGITS: usize = 3;

// Doubles carry 15 significant decimal digits before delta rounding.
const SIGNIFICANT_DIGITS: usize = 15;

/// Formats an absolute gauge value, e.g. `2.500000000000000`.
#[must_use]
pub fn fixed(value: f64) -> String {
    if let Some(text) = non_finite(value) {
        return text.to_owned();
    }
    format!("{value:.prec$}", prec = FIXED_FRACTION_DIGITS)
}

/// Formats a gauge delta with an explicit sign.
///
/// The magnitude is rounded half away from zero to three fraction digits, trailing
/// fraction zeros and a zero integer part are dropped, and anything that rounds to
/// zero is written as `+0`.
///
/// ```
/// use rylv_statsd::format::delta;
///
/// assert_eq!(delta(0.0), "+0");
/// assert_eq!(delta(2.0), "+2");
/// assert_eq!(delta(-3.5), "-3.5");
/// assert_eq!(delta(1234.5678), "+1234.568");
/// assert_eq!(delta(0.5), "+.5");
/// ```
#[must_use]
pub fn delta(value: f64) -> String {
    if let Some(text) = non_finite(value) {
        return text.to_owned();
    }

    let (integer, fraction) = round_decimal(value.abs(), DELTA_FRACTION_DIGITS);
    if integer.is_empty() && fraction.is_empty() {
        return "+0".to_owned();
    }

    let mut out = String::with_capacity(integer.len() + fraction.len() + 2);
    out.push(if value.is_sign_negative() { '-' } else { '+' });
    out.push_str(&integer);
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(&fraction);
    }
    out
}

/// Formats a sample rate as the shortest decimal text that round-trips.
#[must_use]
pub fn rate(value: f64) -> String {
    value.to_string()
}

const fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value.is_infinite() {
        if value.is_sign_negative() {
            Some("-Infinity")
        } else {
            Some("Infinity")
        }
    } else {
        None
    }
}

/// Rounds a non-negative finite `value` to `places` fraction digits.
///
/// Returns the integer digits without leading zeros and the fraction digits without
/// trailing zeros. Both are empty when the value rounds to zero.
fn round_decimal(value: f64, places: usize) -> (String, String) {
    let scientific = format!("{value:.prec$e}", prec = SIGNIFICANT_DIGITS - 1);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i64 = exponent.parse().unwrap_or(0);

    let mut digits: Vec<u8> = mantissa
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();

    // value == 0.d1d2d3... * 10^point
    let mut point = exponent + 1;
    #[allow(clippy::cast_possible_wrap)]
    let keep = point + places as i64;
    if keep < 0 {
        return (String::new(), String::new());
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let keep = keep as usize;
    if keep < digits.len() {
        let round_up = digits[keep] >= 5;
        digits.truncate(keep);
        if round_up && increment(&mut digits) {
            digits.insert(0, 1);
            point += 1;
        }
    }

    let mut integer = String::new();
    let mut fraction = String::new();
    if point > 0 {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let point = point as usize;
        for i in 0..point {
            integer.push(char::from(b'0' + digits.get(i).copied().unwrap_or(0)));
        }
        for &d in digits.iter().skip(point) {
            fraction.push(char::from(b'0' + d));
        }
    } else {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let leading_zeros = (-point) as usize;
        for _ in 0..leading_zeros {
            fraction.push('0');
        }
        for &d in &digits {
            fraction.push(char::from(b'0' + d));
        }
    }

    let integer = integer.trim_start_matches('0').to_owned();
    let fraction = fraction.trim_end_matches('0').to_owned();
    (integer, fraction)
}

/// Adds one unit in the last place. Returns true when the carry overflows.
fn increment(digits: &mut [u8]) -> bool {
    for d in digits.iter_mut().rev() {
        if *d == 9 {
            *d = 0;
        } else {
            *d += 1;
            return false;
        }
    }
    true
}
