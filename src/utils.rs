//! # Formatting Helpers
//!
//! Small formatters shared by the console report and the chart renderer.
//! Counts and rates are printed with thousands separators so
//! large load-test runs stay readable.
//!
//! ## Usage Examples
//!
//! ```rust
//! use chatflow_analyzer::utils::*;
//!
//! assert_eq!(format_count(1234567), "1,234,567");
//! assert_eq!(format_decimal(98765.4321, 2), "98,765.43");
//! ```

/// Format an integer count with thousands separators
///
/// ## Examples
///
/// ```rust
/// # use chatflow_analyzer::utils::format_count;
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(999), "999");
/// assert_eq!(format_count(200000), "200,000");
/// ```
pub fn format_count(count: usize) -> String {
    group_digits(&count.to_string())
}

/// Format a float with fixed precision and thousands separators
///
/// ## Parameters
/// - `value`: Number to format
/// - `precision`: Digits after the decimal point
///
/// ## Examples
///
/// ```rust
/// # use chatflow_analyzer::utils::format_decimal;
/// assert_eq!(format_decimal(1234.5, 2), "1,234.50");
/// assert_eq!(format_decimal(1999.6, 0), "2,000");
/// assert_eq!(format_decimal(-4500.26, 1), "-4,500.3");
/// ```
pub fn format_decimal(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*}", precision, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    out.push_str(&group_digits(integer));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Format a number of seconds without a trailing `.0` for whole values
///
/// ```rust
/// # use chatflow_analyzer::utils::format_seconds;
/// assert_eq!(format_seconds(10.0), "10");
/// assert_eq!(format_seconds(2.5), "2.5");
/// ```
pub fn format_seconds(seconds: f64) -> String {
    if seconds.fract() == 0.0 {
        format!("{:.0}", seconds)
    } else {
        format!("{}", seconds)
    }
}

/// A banner line of `=` characters
pub fn banner(width: usize) -> String {
    "=".repeat(width)
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
