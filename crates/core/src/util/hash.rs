// SPDX-License-Identifier: AGPL-3.0-or-later

use data_encoding::HEXLOWER;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Renders a [`serde_json::Value`] as canonical JSON: object keys sorted
/// lexicographically at every depth, no insignificant whitespace.
///
/// Fingerprints (§4.1) and the anchored-event hash (§4.8) must be stable
/// across serializer versions and independent of input key order, so this
/// is hand-rolled rather than relying on `serde_json`'s default map
/// ordering (which is insertion order unless the `preserve_order` feature
/// is disabled, and is not part of its stability contract either way).
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&serde_json::to_string(s).unwrap_or_default()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key).unwrap_or_default());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
    }
}

/// Lowercase hex SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: impl AsRef<[u8]>) -> String {
    let digest = Sha256::digest(bytes.as_ref());
    HEXLOWER.encode(&digest)
}

/// The first `len` hex characters of the SHA-256 digest of `bytes`.
///
/// Used for provisional ids (§4.1: 16 hex chars) and deterministic
/// sub-operation ids (§4.5: full 64 hex chars, i.e. `len` == digest length).
#[must_use]
pub fn sha256_hex_prefix(bytes: impl AsRef<[u8]>, len: usize) -> String {
    let full = sha256_hex(bytes);
    full.chars().take(len).collect()
}

/// `SHA-256(event_hash || ":" || op_index)`, hex-encoded.
///
/// §4.5's determinism rule: every nested sub-operation within a projected
/// bundle derives its id from the event hash and a monotonically
/// increasing operation index, so replay reproduces identical ids.
#[must_use]
pub fn deterministic_op_id(event_hash: &str, op_index: u64) -> String {
    sha256_hex(format!("{event_hash}:{op_index}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_json_sorts_keys() {
        let a = canonical_json(&json!({"b": 1, "a": 2}));
        let b = canonical_json(&json!({"a": 2, "b": 1}));
        assert_eq!(a, b);
        assert_eq!(a, r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn op_id_is_deterministic() {
        let a = deterministic_op_id("abc123", 0);
        let b = deterministic_op_id("abc123", 0);
        let c = deterministic_op_id("abc123", 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
