//! Numeral parsing and result formatting.
//!
//! Display text follows the browser's number conventions: parsing accepts the
//! longest leading decimal literal, and results are rounded to a fixed number of
//! significant digits before being printed in the shortest form that reads back
//! to the same value.

/// Significant digits kept when tidying a computed result.
pub const RESULT_PRECISION: usize = 12;

/// Enough fractional digits to print any `f64` exactly in scientific notation.
const EXACT_DIGITS: usize = 800;

/// Parses the longest leading decimal literal of `text`.
///
/// Returns `NaN` when `text` does not start with a number, so inputs such as
/// `"Error"`, `"-"` or `""` flow through arithmetic as not-a-number.
#[must_use]
pub fn parse_numeral(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if trimmed[end..].starts_with("Infinity") {
        return if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes.get(end + 1..).map_or(0, count_digits);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = bytes.get(exp_end..).map_or(0, count_digits);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    trimmed[..end].parse().unwrap_or(f64::NAN)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Turns a raw arithmetic result into display text.
///
/// Returns `None` for non-finite results; callers show the error token instead.
#[must_use]
pub fn tidy_result(value: f64) -> Option<String> {
    value
        .is_finite()
        .then(|| format_number(round_significant(value, RESULT_PRECISION)))
}

/// Rounds `value` to `digits` significant decimal digits.
///
/// Works on the exact decimal expansion of the binary value; a tie goes to the
/// larger magnitude, matching `Number.prototype.toPrecision`.
#[must_use]
pub fn round_significant(value: f64, digits: usize) -> f64 {
    if value == 0.0 || !value.is_finite() || digits == 0 {
        return value;
    }

    let exact = format!("{:.*e}", EXACT_DIGITS, value.abs());
    let Some((mantissa, exponent)) = exact.split_once('e') else {
        return value;
    };
    let Ok(mut exponent) = exponent.parse::<i32>() else {
        return value;
    };

    let all: Vec<u8> = mantissa
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();
    let mut kept: Vec<u8> = all.iter().copied().take(digits).collect();

    if all.get(digits).is_some_and(|d| *d >= 5) {
        let mut carry = true;
        for d in kept.iter_mut().rev() {
            if *d == 9 {
                *d = 0;
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, 1);
            kept.pop();
            exponent += 1;
        }
    }

    let text: String = kept.iter().map(|d| char::from(b'0' + d)).collect();
    let rounded: f64 = format!("{}.{}e{exponent}", &text[..1], &text[1..])
        .parse()
        .unwrap_or(value.abs());

    if value.is_sign_negative() {
        -rounded
    } else {
        rounded
    }
}

/// Formats `value` as the shortest decimal that reads back to the same `f64`.
///
/// Layout matches `Number::toString`: plain notation while the decimal exponent
/// is in `[-7, 21)`, otherwise `d.ddde+x`. Negative zero prints as `"0"`.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if value == 0.0 {
        return "0".to_owned();
    }

    let shortest = format!("{:e}", value.abs());
    let (mantissa, exponent) = shortest.split_once('e').unwrap_or((&shortest, "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let k = i32::try_from(digits.len()).unwrap_or(i32::MAX);
    let n = exponent + 1;
    let zeros = |count: i32| "0".repeat(usize::try_from(count).unwrap_or(0));

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", zeros(n - k))
    } else if 0 < n && n <= 21 {
        let split = usize::try_from(n).unwrap_or(0);
        format!("{}.{}", &digits[..split], &digits[split..])
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", zeros(-n))
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let magnitude = (n - 1).abs();
        if k == 1 {
            format!("{digits}e{sign}{magnitude}")
        } else {
            format!("{}.{}e{sign}{magnitude}", &digits[..1], &digits[1..])
        }
    };

    if value < 0.0 { format!("-{body}") } else { body }
}
