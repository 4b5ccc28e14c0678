//! Human-readable, YAML-like rendering of serializable records.
//!
//! Each record becomes one list item. Fields keep their declaration order
//! (serde_json is built with `preserve_order`).

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::{ClientError, ClientResult};

const RESERVED_WORDS: [&str; 8] = ["null", "~", "true", "false", "yes", "no", "on", "off"];
const INDICATOR_CHARS: &str = "-?:,[]{}#&*!|>'\"%@`";

pub fn write_records<T: Serialize, W: Write>(records: &[T], sink: &mut W) -> ClientResult<()> {
    for record in records {
        let block = render_record(record)?;
        sink.write_all(block.as_bytes())
            .map_err(|error| ClientError::dump_write_failed(&error.to_string()))?;
    }
    Ok(())
}

pub fn render_record<T: Serialize>(record: &T) -> ClientResult<String> {
    let value = serde_json::to_value(record)
        .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;

    let mut out = String::new();
    match &value {
        Value::Object(fields) if !fields.is_empty() => {
            for (index, (key, field)) in fields.iter().enumerate() {
                let lead = if index == 0 { "- " } else { "  " };
                push_entry(&mut out, lead, "  ", key, field);
            }
        }
        other => {
            out.push_str("- ");
            out.push_str(&scalar(other));
            out.push('\n');
        }
    }
    Ok(out)
}

fn push_entry(out: &mut String, lead: &str, indent: &str, key: &str, value: &Value) {
    let child_indent = format!("{indent}  ");

    match value {
        Value::Object(fields) if !fields.is_empty() => {
            out.push_str(&format!("{lead}{key}:\n"));
            for (child_key, child) in fields {
                push_entry(out, &child_indent, &child_indent, child_key, child);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            out.push_str(&format!("{lead}{key}:\n"));
            for item in items {
                out.push_str(&format!("{child_indent}- {}\n", scalar(item)));
            }
        }
        Value::String(text) if text.contains('\n') => match block_header(text) {
            Some(header) => {
                out.push_str(&format!("{lead}{key}: {header}\n"));
                let body = text.trim_end_matches('\n');
                for line in body.split('\n') {
                    if line.is_empty() {
                        out.push('\n');
                    } else {
                        out.push_str(&format!("{child_indent}{line}\n"));
                    }
                }
                let trailing = text.len() - body.len();
                for _ in 1..trailing {
                    out.push('\n');
                }
            }
            None => out.push_str(&format!("{lead}{key}: {}\n", double_quoted(text))),
        },
        other => out.push_str(&format!("{lead}{key}: {}\n", scalar(other))),
    }
}

/// Literal block header for a multi-line string, or `None` when the text
/// cannot be written as a literal block.
///
/// The indentation indicator is needed once the first non-empty line starts
/// with a space; chomping follows the number of trailing newlines.
fn block_header(text: &str) -> Option<String> {
    let body = text.trim_end_matches('\n');
    if body.is_empty() || text.chars().any(|ch| ch.is_control() && ch != '\n' && ch != '\t') {
        return None;
    }

    let indicator = match body.split('\n').find(|line| !line.is_empty()) {
        Some(line) if line.starts_with(' ') => "2",
        _ => "",
    };
    let chomping = match text.len() - body.len() {
        0 => "-",
        1 => "",
        _ => "+",
    };
    Some(format!("|{indicator}{chomping}"))
}

/// JSON string syntax is also a valid YAML double-quoted scalar.
fn double_quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("'{}'", text.replace('\'', "''")))
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => quote_if_needed(text),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Object(fields) if fields.is_empty() => "{}".to_string(),
        nested => nested.to_string(),
    }
}

fn quote_if_needed(text: &str) -> String {
    if needs_quotes(text) {
        return format!("'{}'", text.replace('\'', "''"));
    }
    text.to_string()
}

fn needs_quotes(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return true;
    };

    text.trim() != text
        || INDICATOR_CHARS.contains(first)
        || text.contains(": ")
        || text.contains(" #")
        || text.ends_with(':')
        || RESERVED_WORDS.contains(&text.to_ascii_lowercase().as_str())
        || text.parse::<f64>().is_ok()
}
