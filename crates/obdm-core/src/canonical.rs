//! Deterministic JSON canonicalization.
//!
//! The matrix pipeline promises byte-identical output for semantically
//! identical input, which is what lets the orchestration layer detect
//! unchanged runs by digest comparison. This module is the sole
//! construction path for those bytes.
//!
//! Canonicalization happens in two stages:
//!
//! 1. [`canonicalize_value`] rewrites the JSON value tree: object keys are
//!    sorted ascending, arrays whose elements are objects are sorted by the
//!    lexicographic order of their canonical serialization, and arrays of
//!    mutually comparable scalars are sorted ascending. Arrays that are not
//!    comparable (mixed types, nested arrays) are recursed element-wise
//!    without reordering.
//! 2. [`CanonicalBytes::new`] serializes the canonical tree with
//!    `serde_jcs` (RFC 8785), giving compact separators and a fixed number
//!    rendering.
//!
//! `CanonicalBytes` has a private inner field; the constructor is the only
//! way to obtain one, so every digest in the pipeline is guaranteed to be
//! computed over canonical bytes.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by deep-sort canonicalization followed by
/// RFC 8785 serialization.
///
/// # Invariants
///
/// - The only constructor is [`CanonicalBytes::new`].
/// - Object keys are sorted; sortable arrays are sorted.
/// - Serialization is compact with JCS number formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::SerializationFailed`] if the value
    /// cannot be converted to JSON or JCS serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let canonical = canonicalize_value(value);
        let s = serde_jcs::to_string(&canonical)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively canonicalize a JSON value.
///
/// - Objects: keys sorted ascending, values recursed.
/// - Arrays whose first element is an object: every element is
///   canonicalized, then the array is sorted by each element's serialized
///   form.
/// - Arrays of mutually comparable scalars (all numbers, all strings, or
///   all booleans): sorted ascending.
/// - Other arrays: recursed element-wise, order preserved.
/// - Scalars: returned unchanged.
///
/// The function is idempotent: applying it to its own output is a no-op.
pub fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = serde_json::Map::new();
            for (k, v) in entries {
                sorted.insert(k, canonicalize_value(v));
            }
            Value::Object(sorted)
        }
        Value::Array(arr) => Value::Array(canonicalize_array(arr)),
        other => other,
    }
}

fn canonicalize_array(arr: Vec<Value>) -> Vec<Value> {
    if arr.first().is_some_and(Value::is_object) {
        // List of objects: sort by the canonical serialization of each
        // element. Canonicalized objects serialize with sorted keys, so
        // the serialized form is a stable sort key.
        let mut canonical: Vec<Value> = arr.into_iter().map(canonicalize_value).collect();
        canonical.sort_by(|a, b| {
            let sa = serde_json::to_string(a).unwrap_or_default();
            let sb = serde_json::to_string(b).unwrap_or_default();
            sa.cmp(&sb)
        });
        return canonical;
    }

    if scalars_comparable(&arr) {
        let mut sorted = arr;
        sorted.sort_by(|a, b| compare_scalars(a, b));
        return sorted;
    }

    // Not comparable as a whole: recurse without reordering.
    arr.into_iter().map(canonicalize_value).collect()
}

/// Whether every element of the array belongs to a single sortable scalar
/// kind. Empty and single-element arrays are trivially comparable.
fn scalars_comparable(arr: &[Value]) -> bool {
    arr.iter().all(Value::is_number)
        || arr.iter().all(Value::is_string)
        || arr.iter().all(Value::is_boolean)
}

fn compare_scalars(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
