use std::sync::LazyLock;

use chrono::{DateTime, TimeZone};
use regex::Regex;
use serde_json::{json, Value};

use crate::domain::SelectionResult;
use crate::sheets::Row;

/// Width of the result range (columns B through G).
pub const OUTPUT_WIDTH: usize = 6;

static HYPERLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*=HYPERLINK\(\s*".*?"\s*[,;]\s*"(.*)"\s*\)\s*$"#).expect("valid hyperlink regex")
});

/// `=HYPERLINK("link", "label")`, with embedded quotes doubled.
pub fn hyperlink_formula(link: &str, label: &str) -> String {
    format!(
        "=HYPERLINK(\"{}\", \"{}\")",
        link.replace('"', "\"\""),
        label.replace('"', "\"\"")
    )
}

/// Display label of a cell that may hold a HYPERLINK formula.
pub fn hyperlink_label(cell: &str) -> String {
    match HYPERLINK.captures(cell).and_then(|caps| caps.get(1)) {
        Some(label) => label.as_str().replace("\"\"", "\""),
        None => cell.trim().to_string(),
    }
}

pub fn blank_row() -> Row {
    vec![json!(""); OUTPUT_WIDTH]
}

/// Result row for one group: hyperlink, four spacer columns, price.
pub fn output_row(selection: &SelectionResult) -> Row {
    match selection {
        SelectionResult::Winner {
            display_name,
            winning_link,
            price,
        } => vec![
            json!(hyperlink_formula(winning_link, display_name)),
            json!(""),
            json!(""),
            json!(""),
            json!(""),
            json!(price),
        ],
        SelectionResult::NoWinner => blank_row(),
    }
}

/// Log row for a winning group, `None` for a group without a winner.
pub fn log_row(timestamp: &str, selection: &SelectionResult, test_mode: bool) -> Option<Row> {
    match selection {
        SelectionResult::Winner {
            display_name,
            winning_link,
            price,
        } => Some(vec![
            json!(timestamp),
            json!(hyperlink_formula(winning_link, display_name)),
            json!(price),
            Value::Bool(test_mode),
        ]),
        SelectionResult::NoWinner => None,
    }
}

/// `M/D/YYYY H:M:S` without zero padding.
pub fn log_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-m/%-d/%Y %-H:%-M:%-S").to_string()
}

/// Cell contents as text, whatever JSON type the store returned.
pub fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
