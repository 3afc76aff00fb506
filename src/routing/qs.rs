//! Query string codec for route state.
//!
//! Arrays are written comma-joined (`color=red,blue`). On read, repeated keys
//! and bracket keys (`color[]=red`, `color[0]=red`) become arrays; a comma
//! inside a single value is left for the state mapping to split.

use std::borrow::Cow;

use super::route_state::RouteValue;

const ARRAY_DELIMITER: &str = ",";

/// Parses a query string, with or without its leading `?`, into ordered
/// key/value pairs. Repeated keys are merged into one list in first-seen order.
pub fn parse(search: &str) -> Vec<(String, RouteValue)> {
    let search = search.strip_prefix('?').unwrap_or(search);
    let mut entries: Vec<(String, RouteValue)> = Vec::new();

    for pair in search.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode(raw_key);
        let value = decode(raw_value);

        let (key, is_array) = strip_array_suffix(&key);
        if key.is_empty() {
            continue;
        }

        match entries.iter_mut().find(|(k, _)| k.as_str() == key) {
            Some((_, existing)) => merge(existing, value),
            None if is_array => entries.push((key.to_string(), RouteValue::List(vec![value]))),
            None => entries.push((key.to_string(), RouteValue::Text(value))),
        }
    }

    entries
}

/// Serializes key/value pairs into a query string with a leading `?`.
/// Returns an empty string when nothing is left to encode.
pub fn stringify(entries: &[(String, RouteValue)]) -> String {
    let pairs: Vec<String> = entries
        .iter()
        .filter_map(|(key, value)| {
            let encoded = match value {
                RouteValue::Text(s) => encode(s).into_owned(),
                RouteValue::Number(n) => n.to_string(),
                RouteValue::List(values) if values.is_empty() => return None,
                RouteValue::List(values) => values
                    .iter()
                    .map(|v| encode(v))
                    .collect::<Vec<_>>()
                    .join(ARRAY_DELIMITER),
            };
            Some(format!("{}={}", encode(key), encoded))
        })
        .collect();

    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

fn encode(s: &str) -> Cow<'_, str> {
    urlencoding::encode(s)
}

fn decode(s: &str) -> String {
    let spaced = s.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

fn strip_array_suffix(key: &str) -> (&str, bool) {
    if let Some(stripped) = key.strip_suffix("[]") {
        return (stripped, true);
    }

    if let Some(open) = key.rfind('[') {
        let index = &key[open + 1..];
        if let Some(digits) = index.strip_suffix(']') {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return (&key[..open], true);
            }
        }
    }

    (key, false)
}

fn merge(existing: &mut RouteValue, value: String) {
    match existing {
        RouteValue::List(values) => values.push(value),
        other => {
            let first = other.as_text();
            *other = RouteValue::List(vec![first, value]);
        }
    }
}
