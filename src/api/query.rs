//! Query-string encoding for API requests
//!
//! Mirrors the conventions the game backend expects: nested object keys are
//! joined with `.`, array elements repeat their key, and nulls are written
//! as `key=` rather than dropped. Keys and values are percent-encoded per
//! RFC 3986, so a space becomes `%20`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::{Map, Value};

/// Everything except RFC 3986 unreserved characters
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Encode a serializable value as a query string (without the leading `?`).
///
/// Only objects produce output; any other top-level value encodes to the
/// empty string.
pub fn encode<T: Serialize + ?Sized>(params: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(params)?;
    Ok(encode_value(&value))
}

pub fn encode_value(value: &Value) -> String {
    let mut pairs = Vec::new();
    if let Value::Object(map) = value {
        for (key, child) in sorted_entries(map) {
            push_pairs(key, child, &mut pairs);
        }
    }
    pairs.join("&")
}

fn push_pairs(prefix: &str, value: &Value, pairs: &mut Vec<String>) {
    match value {
        Value::Null => pairs.push(format!("{}=", escape(prefix))),
        Value::Bool(b) => pairs.push(format!("{}={b}", escape(prefix))),
        Value::Number(n) => pairs.push(format!("{}={n}", escape(prefix))),
        Value::String(s) => pairs.push(format!("{}={}", escape(prefix), escape(s))),
        Value::Array(items) => {
            for item in items {
                push_pairs(prefix, item, pairs);
            }
        }
        Value::Object(map) => {
            for (key, child) in sorted_entries(map) {
                push_pairs(&format!("{prefix}.{key}"), child, pairs);
            }
        }
    }
}

// Keys are always emitted in sorted order, whatever map backs `Value`.
fn sorted_entries(map: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn escape(raw: &str) -> String {
    utf8_percent_encode(raw, QUERY_COMPONENT).to_string()
}
