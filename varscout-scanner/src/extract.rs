//! Scanning arbitrary text for JSON values.
//!
//! Inline page scripts embed their state as object literals inside larger
//! JavaScript statements (`$rwidgets([...])`, `window.__STATE__ = {...}`).
//! Rather than parse the script, we look for every `{` and ask the JSON
//! decoder whether a complete value starts there.

use serde_json::{Deserializer, Value};
use tracing::trace;

/// Lazy iterator over the JSON values embedded in a piece of text.
///
/// Created by [`find_json_objects`]. Each call to that function starts a
/// fresh scan, so the sequence is restartable.
pub struct EmbeddedObjects<'a> {
    text: &'a str,
    cursor: usize,
}

/// Scan `text` left to right and yield every JSON value that starts at a `{`.
///
/// After a successful decode the scan resumes right after the decoded value,
/// so objects nested inside it are not reported separately. After a failed
/// decode the scan resumes one byte past the failed `{`.
pub fn find_json_objects(text: &str) -> EmbeddedObjects<'_> {
    EmbeddedObjects { text, cursor: 0 }
}

impl EmbeddedObjects<'_> {
    /// Try to decode one value starting exactly at `start`.
    /// Returns the value and the number of bytes it spans.
    fn decode_at(&self, start: usize) -> Option<(Value, usize)> {
        let mut stream = Deserializer::from_str(&self.text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) => Some((value, stream.byte_offset())),
            Some(Err(e)) => {
                trace!("No JSON value at byte {}: {}", start, e);
                None
            }
            None => None,
        }
    }
}

impl Iterator for EmbeddedObjects<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        while self.cursor < self.text.len() {
            let marker = self.cursor + self.text[self.cursor..].find('{')?;

            match self.decode_at(marker) {
                Some((value, consumed)) => {
                    self.cursor = marker + consumed;
                    return Some(value);
                }
                // '{' is a single byte, so marker + 1 is always a char boundary
                None => self.cursor = marker + 1,
            }
        }
        None
    }
}

/// Depth-first search for `key` anywhere inside `value`.
///
/// Objects are searched before their children, in source order, so the
/// outermost occurrence wins. String contents are never inspected.
pub fn find_key<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map
            .get(key)
            .or_else(|| map.values().find_map(|child| find_key(child, key))),
        Value::Array(items) => items.iter().find_map(|item| find_key(item, key)),
        _ => None,
    }
}
