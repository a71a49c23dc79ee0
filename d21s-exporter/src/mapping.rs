//! Metric naming and value conversion.

use thiserror::Error;

/// Build a fully qualified metric name from its components.
///
/// Empty components are skipped: `build_fq_name("d21s", "", "up")` is `d21s_up`.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// Errors from [`parse_duration_secs`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },
    #[error("duration {0:?} out of range")]
    Overflow(String),
}

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Largest magnitude in nanoseconds (that of `i64::MIN`).
const MAX_NANOS: u64 = 1 << 63;

const UNITS: &[(&str, u64)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", NANOS_PER_SEC),
    ("m", 60 * NANOS_PER_SEC),
    ("h", 3_600 * NANOS_PER_SEC),
];

/// Parse a duration string such as `"250ms"`, `"0.169s"` or `"-1h2m3.5s"` into seconds.
///
/// A duration is an optional sign followed by one or more decimal numbers,
/// each with an optional fraction and a mandatory unit (`ns`, `us`, `µs`,
/// `ms`, `s`, `m`, `h`). `"0"` is the only value accepted without a unit.
/// The total is held in nanoseconds and must fit in an `i64`.
pub fn parse_duration_secs(input: &str) -> Result<f64, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());
    let overflow = || DurationError::Overflow(input.to_string());

    let mut s = input;
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    if s == "0" {
        return Ok(0.0);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !s.is_empty() {
        // Integer part.
        let int_len = leading_digits(s);
        let (int_str, rest) = s.split_at(int_len);
        s = rest;
        let int_value: u64 = if int_len > 0 {
            int_str.parse().map_err(|_| overflow())?
        } else {
            0
        };

        // Fraction. Digits beyond u64 precision are ignored.
        let mut fraction: u64 = 0;
        let mut scale: f64 = 1.0;
        let mut has_fraction = false;
        if let Some(rest) = s.strip_prefix('.') {
            let frac_len = leading_digits(rest);
            has_fraction = frac_len > 0;
            let mut saturated = false;
            for digit in rest[..frac_len].bytes() {
                if saturated {
                    continue;
                }
                match fraction
                    .checked_mul(10)
                    .and_then(|f| f.checked_add(u64::from(digit - b'0')))
                {
                    Some(f) => {
                        fraction = f;
                        scale *= 10.0;
                    }
                    None => saturated = true,
                }
            }
            s = &rest[frac_len..];
        }

        if int_len == 0 && !has_fraction {
            return Err(invalid());
        }

        // Unit runs until the next number.
        let unit_len = s
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        if unit_len == 0 {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let (unit_str, rest) = s.split_at(unit_len);
        s = rest;

        let unit = UNITS
            .iter()
            .find(|(name, _)| *name == unit_str)
            .map(|(_, nanos)| *nanos)
            .ok_or_else(|| DurationError::UnknownUnit {
                unit: unit_str.to_string(),
                input: input.to_string(),
            })?;

        let mut value = int_value.checked_mul(unit).ok_or_else(overflow)?;
        if fraction > 0 {
            let frac_nanos = (fraction as f64 * (unit as f64 / scale)) as u64;
            value = value.checked_add(frac_nanos).ok_or_else(overflow)?;
        }

        total = total.checked_add(value).ok_or_else(overflow)?;
        if total > MAX_NANOS || (!negative && total == MAX_NANOS) {
            return Err(overflow());
        }
    }

    let seconds =
        (total / NANOS_PER_SEC) as f64 + (total % NANOS_PER_SEC) as f64 / NANOS_PER_SEC as f64;
    Ok(if negative { -seconds } else { seconds })
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Convert a latency string to seconds, substituting 0 for anything unparseable.
pub fn latency_seconds(latency: &str) -> f64 {
    parse_duration_secs(latency).unwrap_or(0.0)
}
