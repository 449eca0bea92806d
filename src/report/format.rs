//! Number formatting shared by the report and the dashboard view

use rust_decimal::{Decimal, RoundingStrategy};

fn round(value: Decimal, decimals: u32) -> Decimal {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    // Avoid rendering "-0.00"
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// "1,468.50" style: fixed decimals, thousands separators
pub fn format_amount(value: Decimal, decimals: u32) -> String {
    let rounded = round(value, decimals);
    let text = format!("{:.*}", decimals as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let mut out = String::new();
    if rounded.is_sign_negative() {
        out.push('-');
    }
    out.push_str(&group_thousands(&int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(&frac);
    }
    out
}

/// Always signed: "+1.85", "-0.25", "+0.00"
pub fn format_signed(value: Decimal, decimals: u32) -> String {
    let rounded = round(value, decimals);
    let body = format_amount(rounded.abs(), decimals);
    if rounded.is_sign_negative() {
        format!("-{}", body)
    } else {
        format!("+{}", body)
    }
}

/// Rate with its difference in parentheses when one exists
pub fn format_rate_with_diff(rate: Option<Decimal>, diff: Option<Decimal>) -> String {
    match (rate, diff) {
        (Some(rate), Some(diff)) => format!("{} ({})", format_amount(rate, 2), format_signed(diff, 2)),
        (Some(rate), None) => format_amount(rate, 2),
        (None, _) => "-".to_string(),
    }
}
