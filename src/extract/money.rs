//! Brazilian currency parsing and formatting
//!
//! Spoken amounts arrive in pt-BR conventions: `.` as thousands separator,
//! `,` as decimal separator, plus the shorthands "50 mil" and "80k".

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref AMOUNT: Regex =
        Regex::new(r"(?i)(?:r\$\s*)?(\d+(?:\.\d{3})*(?:,\d+)?|\d+(?:,\d+)?)\s*(mil|k)?\b")
            .expect("amount regex");
}

/// Parse a pt-BR formatted amount out of `text`
///
/// `"50 mil"` -> 50000.0, `"R$ 1.234,56"` -> 1234.56, `"80k"` -> 80000.0
pub fn parse_brl(text: &str) -> Option<f64> {
    let caps = AMOUNT.captures(text)?;
    let digits = caps.get(1)?.as_str().replace('.', "").replace(',', ".");
    let mut value: f64 = digits.parse().ok()?;

    if caps.get(2).is_some() {
        value *= 1000.0;
    }

    if value > 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Parse an already-isolated numeric capture, applying the same separator rules
pub fn parse_plain(digits: &str) -> Option<f64> {
    let cleaned = digits.trim().replace('.', "").replace(',', ".");
    cleaned.parse::<f64>().ok().filter(|v| *v > 0.0)
}

/// Format a value the way the responses speak money: `50000.0` -> `"50.000,00"`
pub fn format_brl(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}{},{:02}", sign, grouped, frac)
}
