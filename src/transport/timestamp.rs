//! Timestamp conversions between command-line text, wire formats and
//! printed output.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde_json::{Number, Value};

/// Epoch seconds for a timestamp argument, the way the json protocols send
/// them. Accepts epoch seconds, RFC 3339, `YYYY-MM-DDTHH:MM:SS` and
/// `YYYY-MM-DD` (both read as UTC).
pub fn to_epoch(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Ok(seconds) = text.parse::<i64>() {
        return Some(Value::from(seconds));
    }
    if let Ok(seconds) = text.parse::<f64>() {
        return Number::from_f64(seconds).map(Value::Number);
    }

    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })?;

    let micros = parsed.timestamp_subsec_micros();
    if micros == 0 {
        Some(Value::from(parsed.timestamp()))
    } else {
        Number::from_f64(parsed.timestamp() as f64 + f64::from(micros) / 1_000_000.0).map(Value::Number)
    }
}

/// Printable form of a timestamp from a response: epoch numbers and
/// RFC 3339 strings become `YYYY-MM-DD HH:MM:SS[.ffffff]+HH:MM`. Anything
/// else is returned as `None`.
pub fn display(value: &Value) -> Option<String> {
    let parsed: DateTime<FixedOffset> = match value {
        Value::Number(number) => {
            let micros = (number.as_f64()? * 1_000_000.0).round() as i64;
            DateTime::<Utc>::from_timestamp_micros(micros)?.fixed_offset()
        }
        Value::String(text) => DateTime::parse_from_rfc3339(text.trim()).ok()?,
        _ => return None,
    };

    let mut out = parsed.format("%Y-%m-%d %H:%M:%S").to_string();
    let micros = parsed.nanosecond() / 1_000;
    if micros != 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out.push_str(&parsed.format("%:z").to_string());
    Some(out)
}
