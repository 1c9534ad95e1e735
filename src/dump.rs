//! Format decoded values for display (dump text, one-line summary).

use crate::value::Value;

fn hex_string(b: &[u8]) -> String {
    b.iter().map(|x| format!("{:02x}", x)).collect::<Vec<_>>().join(" ")
}

/// Byte strings that are printable UTF-8 are shown quoted, anything else as hex.
pub fn format_bytes(b: &[u8]) -> String {
    match std::str::from_utf8(b) {
        Ok(s) if !s.chars().any(char::is_control) => format!("{:?}", s),
        _ => format!("hex({})", hex_string(b)),
    }
}

/// Multi-line rendering of a value, indented by `indent` levels.
pub fn value_to_dump(v: &Value, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    match v {
        Value::Integer(n) => format!("{}{}", pad, n),
        Value::Bytes(b) => format!("{}{}", pad, format_bytes(b)),
        Value::Dict(d) => {
            if d.is_empty() {
                return format!("{}{{}}", pad);
            }
            let mut lines: Vec<String> = vec![format!("{}{{", pad)];
            for (k, val) in d {
                let sub = value_to_dump(val, indent + 1);
                lines.push(format!("{}  {}: {}", pad, format_bytes(k), sub.trim_start()));
            }
            lines.push(format!("{}}}", pad));
            lines.join("\n")
        }
        Value::List(lst) => {
            if lst.is_empty() {
                return format!("{}[]", pad);
            }
            let mut lines: Vec<String> = vec![format!("{}[", pad)];
            for (i, item) in lst.iter().enumerate() {
                let sub = value_to_dump(item, indent + 1);
                lines.push(format!("{}  [{}] {}", pad, i, sub.trim_start()));
            }
            lines.push(format!("{}]", pad));
            lines.join("\n")
        }
    }
}

/// First line of value_to_dump, with a size hint for containers.
pub fn value_summary_line(v: &Value) -> String {
    match v {
        Value::List(l) => format!("list ({} items)", l.len()),
        Value::Dict(d) => format!("dict ({} keys)", d.len()),
        _ => value_to_dump(v, 0),
    }
}
