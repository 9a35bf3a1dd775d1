//! Utility helpers shared across the WASM frontend.

use chrono::{NaiveDate, Utc};
use serde_json::Value;

/// Render a number the way the browser prints it: integral values without a
/// fractional part, everything else with the shortest representation.
pub fn display_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// `45` -> `"45%"`, `45.5` -> `"45.5%"`.
pub fn percent(n: f64) -> String {
    format!("{}%", display_number(n))
}

/// Display text for a metric value from a `key -> value` payload.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(display_number).unwrap_or_else(|| n.to_string()),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Colombian number format: `.` groups thousands, `,` separates decimals.
pub fn format_number(n: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if n.is_sign_negative() && n != 0.0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// Today's date in UTC, matching what the server stamps on reports.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Local wall-clock time for timeline entries, `HH:MM:SS`.
pub fn now_time_label() -> String {
    let date = js_sys::Date::new_0();
    format!(
        "{:02}:{:02}:{:02}",
        date.get_hours(),
        date.get_minutes(),
        date.get_seconds()
    )
}

/// CSS suffix for a numeric task priority (1 high, 2 medium, 3 low).
pub fn priority_class(priority: Option<u8>) -> &'static str {
    match priority {
        Some(1) => "high",
        Some(3) => "low",
        _ => "medium",
    }
}

/// `YYYY-MM-DD…` (ISO date or datetime) as `D/M/YYYY`, the es-CO short date.
/// Unparseable input is returned as-is.
pub fn short_date(iso: &str) -> String {
    let date_part = iso.get(..10).unwrap_or(iso);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(d) => d.format("%-d/%-m/%Y").to_string(),
        Err(_) => iso.to_string(),
    }
}
