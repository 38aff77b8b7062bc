//! JSON deep-merge used for partial updates and default filling

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use super::{StoreError, StoreResult};
use crate::models::SECRET_MASK;

/// Keys a patch may never overwrite
pub const PROTECTED_KEYS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// Merge `patch` into `target` in place.
///
/// Objects merge key by key, recursively. Scalars, arrays and `null` replace
/// whatever was there.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value)
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Copy of an object patch without the protected top-level keys
pub fn sanitize_patch(patch: &Value) -> StoreResult<Map<String, Value>> {
    let Value::Object(map) = patch else {
        return Err(StoreError::InvalidPatch);
    };
    let mut map = map.clone();
    for key in PROTECTED_KEYS {
        map.remove(key);
    }
    Ok(map)
}

/// Overlay a partial JSON value onto `base` and deserialize the result.
///
/// `label` names the value in the error message, e.g. "voice".
pub fn merge_onto<T>(base: &T, partial: Option<&Value>, label: &str) -> StoreResult<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut value = serde_json::to_value(base)?;
    if let Some(partial) = partial.filter(|p| !p.is_null()) {
        if !partial.is_object() {
            return Err(StoreError::InvalidRecord(format!("{label} must be an object")));
        }
        deep_merge(&mut value, partial);
    }
    serde_json::from_value(value)
        .map_err(|e| StoreError::InvalidRecord(format!("Invalid {label}: {e}")))
}

/// Remove `parent.key` from a patch when the caller echoed the secret mask back.
///
/// Pass an empty `parent` for a top-level key.
pub fn strip_masked_secret(patch: &mut Value, parent: &str, key: &str) {
    let holder = if parent.is_empty() {
        Some(patch)
    } else {
        patch.get_mut(parent)
    };
    if let Some(Value::Object(holder)) = holder {
        if holder.get(key).and_then(Value::as_str) == Some(SECRET_MASK) {
            holder.remove(key);
        }
    }
}
