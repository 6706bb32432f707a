// Display helpers shared by the views.

use chrono::{DateTime, Utc};

/// Price in rupees with thousands separators and at most two decimals:
/// `₹125,000`, `₹1,500.5`.
pub fn format_price(amount: f64) -> String {
    if !amount.is_finite() {
        return "₹-".to_string();
    }
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::from(if negative { "-₹" } else { "₹" });
    out.push_str(&grouped);
    if frac > 0 {
        let decimals = format!("{frac:02}");
        out.push('.');
        out.push_str(decimals.trim_end_matches('0'));
    }
    out
}

/// Calendar date, or `-` when unknown.
pub fn format_date(dt: Option<DateTime<Utc>>) -> String {
    dt.map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Date and time to the minute, for message headers.
pub fn format_datetime(dt: Option<DateTime<Utc>>) -> String {
    dt.map(|d| d.format("%d %b %H:%M").to_string())
        .unwrap_or_default()
}

/// Cut `s` to at most `max` characters, ending with an ellipsis when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}
