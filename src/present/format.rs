use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format a decimal amount with thousand separators and 2 decimal places.
/// e.g. `1234567.89` → `"$1,234,567.89"`
pub fn format_amount(val: Decimal) -> String {
    let rounded = round_half_up(val, 2);
    let abs = rounded.abs();
    let formatted = format!("{abs:.2}");
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if rounded < Decimal::ZERO {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// `40` with one decimal → `"40.0%"`
pub fn format_percentage(val: Decimal, decimals: u32) -> String {
    let rounded = round_half_up(val, decimals);
    format!("{rounded:.prec$}%", prec = decimals as usize)
}

/// Signed thousands with one decimal, e.g. `1234` → `"+1.2k"`, `-500` → `"-0.5k"`.
pub fn format_compact_signed(val: Decimal) -> String {
    let thousands = round_half_up(val / Decimal::ONE_THOUSAND, 1);
    if val >= Decimal::ZERO {
        format!("+{thousands:.1}k")
    } else {
        format!("{thousands:.1}k")
    }
}

/// Axis label style: `"$1.2k"`.
pub fn format_axis_thousands(val: Decimal) -> String {
    let thousands = round_half_up(val / Decimal::ONE_THOUSAND, 1);
    format!("${thousands:.1}k")
}

/// e.g. `"Mar 05, 2024"`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

/// e.g. `"03/05/2024"`
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// Safe for multi-byte UTF-8 characters.
pub fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// A `[███░░]` bar for a percentage clamped to 0..=100.
pub fn progress_bar(percentage: Decimal, width: usize) -> String {
    let ratio = (percentage / Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);
    let filled = (ratio * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

fn round_half_up(val: Decimal, dp: u32) -> Decimal {
    val.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}
