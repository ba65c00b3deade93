//! Number rendering following ECMAScript `Number.prototype.toString`.

use serde_json::Number;

/// Appends the JSON text of `number` to `out`.
///
/// Integers print in decimal. Floats print their shortest round-trip digits,
/// without a fraction when integral, switching to exponent form outside
/// `[1e-6, 1e21)`.
pub(crate) fn write_number(number: &Number, out: &mut String) {
    match number.as_f64() {
        Some(float) if number.is_f64() => write_f64(float, out),
        _ => out.push_str(&number.to_string()),
    }
}

fn write_f64(value: f64, out: &mut String) {
    if value == 0.0 {
        // Covers -0.
        out.push('0');
        return;
    }
    if value.is_sign_negative() {
        out.push('-');
    }
    // `{:e}` yields the shortest digits that round-trip, e.g. `1.2345e-7`.
    let sci = format!("{:e}", value.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let n = exponent + 1;

    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((n - k) as usize));
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-n) as usize));
        out.push_str(&digits);
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        let e = n - 1;
        out.push('e');
        out.push(if e >= 0 { '+' } else { '-' });
        out.push_str(&e.abs().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(value: f64) -> String {
        let mut out = String::new();
        write_f64(value, &mut out);
        out
    }

    #[test]
    fn integral_floats_drop_the_fraction() {
        assert_eq!(render(1.0), "1");
        assert_eq!(render(-42.0), "-42");
        assert_eq!(render(-0.0), "0");
        assert_eq!(render(1e20), "100000000000000000000");
    }

    #[test]
    fn fractions_use_shortest_digits() {
        assert_eq!(render(0.1), "0.1");
        assert_eq!(render(1.5), "1.5");
        assert_eq!(render(123.456), "123.456");
        assert_eq!(render(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(render(0.000001), "0.000001");
    }

    #[test]
    fn large_and_small_magnitudes_use_exponents() {
        assert_eq!(render(1e21), "1e+21");
        assert_eq!(render(1.5e300), "1.5e+300");
        assert_eq!(render(1e-7), "1e-7");
        assert_eq!(render(-2.5e-10), "-2.5e-10");
    }

    #[test]
    fn integers_print_verbatim() {
        let mut out = String::new();
        write_number(&Number::from(u64::MAX), &mut out);
        out.push(' ');
        write_number(&Number::from(-7i64), &mut out);
        assert_eq!(out, "18446744073709551615 -7");
    }
}
