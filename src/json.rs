//! JSON text helpers for config documents.
//!
//! Config files are JSON that may carry JavaScript style comments. Comments
//! inside string literals are left alone. Output is pretty printed with
//! sorted keys so stored documents diff cleanly.

use serde::Serialize;
use serde_json::{Map, Value, ser::PrettyFormatter};

use crate::error::Result;

/// Parses JSON text, first removing `//` and `/* */` comments when
/// `parse_comments` is set.
pub fn loads(text: &str, parse_comments: bool) -> Result<Value> {
    let value = match parse_comments {
        true => serde_json::from_str(&strip_comments(text))?,
        false => serde_json::from_str(text)?,
    };

    Ok(value)
}

/// Renders `value` indented by four spaces, with object keys sorted.
pub fn dumps(value: &Value) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    sorted(value).serialize(&mut serializer)?;

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Renders `value` on a single line, with object keys sorted.
pub fn dumps_compact(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(&sorted(value))?)
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut keys: Vec<&String> = object.keys().collect();
            keys.sort_unstable();
            let map: Map<String, Value> = keys
                .into_iter()
                .map(|key| (key.clone(), sorted(&object[key])))
                .collect();
            Value::Object(map)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

fn strip_comments(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            output.push(c);
            match c {
                '\\' => output.extend(chars.next()),
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                output.push(c);
            }
            ('/', Some('/')) => {
                // Keep the line break, drop the rest of the line.
                while chars.next_if(|&next| next != '\n' && next != '\r').is_some() {}
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
                output.push(' ');
            }
            _ => output.push(c),
        }
    }

    output
}
