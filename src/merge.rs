//! Deep merge of JSON documents.
//!
//! Objects are merged key by key. Arrays and scalars are atomic: they are
//! copied wholesale from the base when the overlay lacks the key, and never
//! merged element-wise. Objects nested inside arrays cannot be merged in a
//! meaningful order, so copying such an array is refused.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("cannot handle objects inside arrays (at {path})")]
    ObjectInArray { path: String },
}

/// Fills every key present in `base` but absent in `overlay`.
///
/// Keys already present in `overlay` keep their value, even when it is
/// `null`. When both sides hold an object under the same key the merge
/// recurses. `base` is left untouched.
pub fn merge(overlay: &mut Value, base: &Value) -> Result<(), MergeError> {
    merge_at(overlay, base, &mut String::new())
}

fn merge_at(overlay: &mut Value, base: &Value, path: &mut String) -> Result<(), MergeError> {
    let (Value::Object(overlay), Value::Object(base)) = (overlay, base) else {
        return Ok(());
    };

    for (key, value) in base {
        let len = path.len();
        path.push('/');
        path.push_str(key);

        match overlay.get_mut(key) {
            None => {
                overlay.insert(key.clone(), copy_atomic(value, path)?);
            }
            Some(existing) if existing.is_object() && value.is_object() => {
                merge_at(existing, value, path)?;
            }
            Some(_) => {}
        }

        path.truncate(len);
    }

    Ok(())
}

fn copy_atomic(value: &Value, path: &str) -> Result<Value, MergeError> {
    if let Value::Array(items) = value {
        for item in items {
            match item {
                Value::Object(_) => {
                    return Err(MergeError::ObjectInArray {
                        path: path.to_owned(),
                    });
                }
                Value::Array(_) => {
                    copy_atomic(item, path)?;
                }
                _ => {}
            }
        }
    }

    Ok(value.clone())
}
