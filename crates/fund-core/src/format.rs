use chrono::{Datelike, NaiveDate};

/// Placeholder for values that were not reported.
pub const UNAVAILABLE: &str = "--";

/// Month abbreviations as printed in the source report, fixed regardless of
/// runtime locale.
const MONTH_ABBREV: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Format a fractional value as a percentage with two decimals.
///
/// With `signed`, non-negative values get a leading `+`. Absent or
/// non-finite values render as the `--` placeholder, never as `0.00%`.
pub fn format_percentage(value: Option<f64>, signed: bool) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let sign = if signed && v >= 0.0 { "+" } else { "" };
            format!("{}{:.2}%", sign, v * 100.0)
        }
        _ => UNAVAILABLE.to_string(),
    }
}

/// `jan/25`-style label for a month, empty when the month is unknown.
pub fn format_month_label(month: Option<NaiveDate>) -> String {
    match month {
        Some(d) => {
            let abbrev = MONTH_ABBREV[d.month0() as usize];
            format!("{}/{:02}", abbrev, d.year() % 100)
        }
        None => String::new(),
    }
}
