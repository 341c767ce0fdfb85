// src/merge.rs

//! Merge policy for combining a task's record with a freshly produced
//! partial result.
//!
//! Evaluated key by key over `incoming`:
//! 1. protected control fields (`required_steps`/`unlocks`, `complexity`)
//!    keep the base value;
//! 2. `confidence` becomes the mean when both sides are numbers, and is
//!    otherwise left alone;
//! 3. two nested objects merge recursively under this same policy;
//! 4. sequences and scalars (strings, numbers, booleans) are coerced to
//!    sequences and set-unioned;
//! 5. anything else (missing base value, null, object vs non-object) is
//!    overwritten by `incoming`, with a string stored as a one-element
//!    sequence so string fields always come out as lists.
//!
//! The union keeps base items first, then unseen incoming items. Callers
//! must only rely on membership, not on order.

use serde_json::{Number, Value};
use tracing::trace;

use crate::types::{COMPLEXITY_KEY, CONFIDENCE_KEY, Record, UNLOCKS_ALIAS, UNLOCKS_KEY};

/// Keys never overwritten by a merge.
pub const PROTECTED_KEYS: [&str; 3] = [UNLOCKS_KEY, UNLOCKS_ALIAS, COMPLEXITY_KEY];

/// Merge `incoming` into `base` in place.
pub fn merge_into(base: &mut Record, incoming: Record) {
    for (key, incoming_value) in incoming {
        if PROTECTED_KEYS.contains(&key.as_str()) {
            trace!(key = %key, "merge: protected key left unchanged");
            continue;
        }

        if key == CONFIDENCE_KEY {
            if let Some(mean) = base.get(&key).and_then(|b| mean_of(b, &incoming_value)) {
                base.insert(key, mean);
            }
            continue;
        }

        let merged = match base.remove(&key) {
            Some(Value::Object(mut base_obj)) => match incoming_value {
                Value::Object(incoming_obj) => {
                    merge_into(&mut base_obj, incoming_obj);
                    Value::Object(base_obj)
                }
                other => overwrite_with(other),
            },
            Some(base_value) => match as_sequence(base_value) {
                Ok(base_items) => match as_sequence(incoming_value) {
                    Ok(incoming_items) => Value::Array(union(base_items, incoming_items)),
                    Err(incoming_value) => incoming_value,
                },
                Err(_) => overwrite_with(incoming_value),
            },
            None => overwrite_with(incoming_value),
        };

        base.insert(key, merged);
    }
}

/// Merge `incoming` into a copy of `base` and return the result.
pub fn merged(base: &Record, incoming: Record) -> Record {
    let mut out = base.clone();
    merge_into(&mut out, incoming);
    out
}

fn mean_of(a: &Value, b: &Value) -> Option<Value> {
    let (a, b) = (a.as_f64()?, b.as_f64()?);
    Number::from_f64((a + b) / 2.0).map(Value::Number)
}

/// Coerce a sequence or scalar into a sequence. Objects and null are handed
/// back unchanged in `Err`.
fn as_sequence(value: Value) -> Result<Vec<Value>, Value> {
    match value {
        Value::Array(items) => Ok(items),
        scalar @ (Value::String(_) | Value::Number(_) | Value::Bool(_)) => Ok(vec![scalar]),
        other => Err(other),
    }
}

fn overwrite_with(value: Value) -> Value {
    match value {
        s @ Value::String(_) => Value::Array(vec![s]),
        other => other,
    }
}

fn union(mut base: Vec<Value>, incoming: Vec<Value>) -> Vec<Value> {
    dedup(&mut base);
    for item in incoming {
        if !base.contains(&item) {
            base.push(item);
        }
    }
    base
}

fn dedup(items: &mut Vec<Value>) {
    let mut seen: Vec<Value> = Vec::with_capacity(items.len());
    items.retain(|item| {
        if seen.contains(item) {
            false
        } else {
            seen.push(item.clone());
            true
        }
    });
}
