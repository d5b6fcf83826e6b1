use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

/// The store's schema-less representation of one document's fields.
pub type RawDocument = Map<String, Value>;

/// Separator of nested field paths, e.g. `geocoding.latitude`.
pub const FIELD_SEPARATOR: char = '.';

/// Reads a possibly nested field (`a.b.c`) out of a raw document.
pub fn get_field<'a>(document: &'a RawDocument, field_path: &str) -> Option<&'a Value> {
    let mut segments = field_path.split(FIELD_SEPARATOR);
    let first = segments.next()?;
    let mut current = document.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Writes a possibly nested field, creating intermediate maps and replacing
/// any non-map value that sits on the path.
pub fn set_field(document: &mut RawDocument, field_path: &str, value: Value) {
    match field_path.split_once(FIELD_SEPARATOR) {
        None => {
            document.insert(field_path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = document
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                set_field(child, rest, value);
            }
        }
    }
}

/// Removes a possibly nested field. Missing paths are ignored.
pub fn remove_field(document: &mut RawDocument, field_path: &str) -> Option<Value> {
    match field_path.split_once(FIELD_SEPARATOR) {
        None => document.remove(field_path),
        Some((head, rest)) => match document.get_mut(head) {
            Some(Value::Object(child)) => remove_field(child, rest),
            _ => None,
        },
    }
}

/// Merges `update` into `target`. Nested maps are merged key by key, every
/// other value replaces what was there.
pub fn deep_merge(target: &mut RawDocument, update: RawDocument) {
    for (key, value) in update {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Drops top-level `null` fields.
pub fn strip_nulls(document: &mut RawDocument) {
    document.retain(|_, value| !value.is_null());
}

/// JavaScript style truthiness, used for flag fields that may be stored as
/// booleans, numbers or strings.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Reads a number that may have been stored either as a JSON number or as a
/// numeric string.
pub fn as_f64_lenient(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Adds `delta` to a number, keeping integer arithmetic when both sides are
/// integers. A non-numeric `current` is treated as zero.
pub fn add_numbers(current: Option<&Value>, delta: &Number) -> Value {
    let current = match current {
        Some(Value::Number(n)) => n.clone(),
        _ => Number::from(0),
    };
    if let (Some(a), Some(b)) = (current.as_i64(), delta.as_i64()) {
        if let Some(sum) = a.checked_add(b) {
            return Value::Number(Number::from(sum));
        }
    }
    let sum = current.as_f64().unwrap_or(0.0) + delta.as_f64().unwrap_or(0.0);
    Number::from_f64(sum).map(Value::Number).unwrap_or(Value::Null)
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Whether two values share a type and can be range compared.
pub fn is_comparable(a: &Value, b: &Value) -> bool {
    type_rank(a) == type_rank(b)
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    let x = a.as_f64().unwrap_or(f64::NAN);
    let y = b.as_f64().unwrap_or(f64::NAN);
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

/// Total order over stored values: values of different types order by type
/// (null < bool < number < string < array < map), values of the same type by
/// their natural order.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (left, right) in x.iter().zip(y.iter()) {
                let ord = compare_values(left, right);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            let mut left: Vec<_> = x.iter().collect();
            let mut right: Vec<_> = y.iter().collect();
            left.sort_by(|p, q| p.0.cmp(q.0));
            right.sort_by(|p, q| p.0.cmp(q.0));
            for ((lk, lv), (rk, rv)) in left.iter().zip(right.iter()) {
                let ord = lk.cmp(rk).then_with(|| compare_values(lv, rv));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            left.len().cmp(&right.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Equality under [`compare_values`], so `1` equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    compare_values(a, b) == Ordering::Equal
}
