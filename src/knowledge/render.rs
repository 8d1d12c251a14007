use serde_json::Value;

const MAX_DEPTH: usize = 4;

/// "late_fee_per_day" -> "Late fee per day". Leading ordering digits ("6_circulation") are dropped.
pub fn humanize_key(key: &str) -> String {
    let trimmed = key.trim_start_matches(|c: char| c.is_ascii_digit() || c == '_');
    let base = if trimmed.is_empty() { key } else { trimmed };
    let spaced = base.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { "Yes".to_string() } else { "No".to_string() }),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn render_into(value: &Value, depth: usize, out: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    if depth >= MAX_DEPTH {
        if let Ok(compact) = serde_json::to_string(value) {
            out.push(format!("{}- {}", indent, compact));
        }
        return;
    }

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match scalar(child) {
                    Some(text) => out.push(format!("{}- **{}:** {}", indent, humanize_key(key), text)),
                    None if child.is_null() => {}
                    None => {
                        out.push(format!("{}- **{}**", indent, humanize_key(key)));
                        render_into(child, depth + 1, out);
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match scalar(item) {
                    Some(text) => out.push(format!("{}- {}", indent, text)),
                    None => render_into(item, depth, out),
                }
            }
        }
        other => {
            if let Some(text) = scalar(other) {
                out.push(format!("{}{}", indent, text));
            }
        }
    }
}

/// Markdown bullet list for a knowledge-base record.
pub fn to_markdown(value: &Value) -> String {
    let mut lines = Vec::new();
    render_into(value, 0, &mut lines);
    lines.join("\n")
}

/// `to_markdown` under a bold heading, or `None` when the record renders to nothing.
pub fn titled(title: &str, value: &Value) -> Option<String> {
    let body = to_markdown(value);
    if body.trim().is_empty() {
        None
    } else {
        Some(format!("**{}**\n\n{}", title, body))
    }
}
