//! Canonical JSON bytes for artifact digests.
//!
//! Transcript digests must be byte-stable across runs, so the artifact
//! values are rendered through exactly one place. `serde_json` already
//! serializes maps in sorted key order (its map is a `BTreeMap` unless
//! the `preserve_order` feature is on, which this workspace never
//! enables) and emits compact output; what it does not guard against is
//! float formatting drift, so non-integer numbers are rejected here
//! before serialization.

use serde_json::Value;

/// Error type for canonical JSON rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonError {
    /// A JSON number was not an integer (float, NaN, Infinity).
    NonIntegerNumber { raw: String },
}

impl std::fmt::Display for CanonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonIntegerNumber { raw } => {
                write!(f, "non-integer number in canonical JSON: {raw}")
            }
        }
    }
}

impl std::error::Error for CanonError {}

/// Render `value` as canonical JSON bytes: sorted keys, compact form,
/// integers only.
///
/// # Errors
///
/// Returns [`CanonError::NonIntegerNumber`] if any number in `value` is
/// not representable as `i64` or `u64`.
pub fn canonical_json_bytes(value: &Value) -> Result<Vec<u8>, CanonError> {
    reject_non_integers(value)?;
    // Infallible for integer-only values: no map keys can fail and no
    // floats remain.
    Ok(serde_json::to_vec(value).unwrap_or_default())
}

fn reject_non_integers(value: &Value) -> Result<(), CanonError> {
    match value {
        Value::Number(n) => {
            if n.as_i64().is_none() && n.as_u64().is_none() {
                return Err(CanonError::NonIntegerNumber { raw: n.to_string() });
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_non_integers),
        Value::Object(map) => map.values().try_for_each(reject_non_integers),
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
    }
}
