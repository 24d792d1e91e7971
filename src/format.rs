use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

pub const MISSING: &str = "N/A";

pub fn cell<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn yes_no(value: Option<bool>) -> String {
    match value {
        Some(true) => "yes".to_string(),
        Some(false) => "no".to_string(),
        None => MISSING.to_string(),
    }
}

/// `2017-03-14T19:00:00.000000Z` → `2017-03-14`. Unparseable input is kept.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

pub fn date_cell(value: Option<&str>) -> String {
    cell(value.map(format_date))
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}...")
}

pub fn build_table(title: &str, headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, value) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(value.chars().count());
            }
        }
    }

    let render = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![title.to_string()];
    if rows.is_empty() {
        lines.push("No results.".to_string());
        return lines;
    }
    lines.push(render(headers.to_vec()));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(render(row.iter().map(String::as_str).collect()));
    }
    lines
}

pub fn build_panel(title: &str, fields: &[(&str, String)]) -> Vec<String> {
    let key_width = fields
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);
    let mut lines = vec![title.to_string()];
    for (key, value) in fields {
        lines.push(format!("  {key:<key_width$}  {value}"));
    }
    lines
}

/// Free-form payloads (graphs, writeups): the `data`/`info` member when there
/// is one, pretty-printed under a title.
pub fn build_document(title: &str, body: &Value) -> Vec<String> {
    let payload = ["data", "info"]
        .iter()
        .find_map(|key| body.get(key))
        .unwrap_or(body);
    let mut lines = vec![title.to_string()];
    match payload {
        Value::Null => lines.push("No results.".to_string()),
        Value::String(text) => lines.extend(text.lines().map(str::to_owned)),
        other => lines.extend(format!("{other:#}").lines().map(str::to_owned)),
    }
    lines
}
