//! Normalization of raw `animals` rows into [`Animal`].
//!
//! The store is weakly typed: `photos` has been written as a JSON array, a
//! bare URL string and `null` over time, and text columns may be missing.
//! Everything past this module only ever sees the strict shape.

use serde_json::Value;

use crate::animal::{Animal, AnimalStatus, Sex, Size, Species};

/// Coerce a raw `photos` value into an ordered list of strings.
///
/// - array: every element becomes a string, order and length preserved
///   (strings verbatim, `null` as `"null"`, other values as their JSON text)
/// - non-empty string: a single-element list
/// - anything else: empty
pub fn normalize_photos(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(items) => items.iter().map(coerce_to_string).collect(),
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // Numbers, booleans, null, nested arrays and objects.
        other => other.to_string(),
    }
}

/// Build an [`Animal`] from one raw row.
///
/// Total over every input: a non-object yields an animal with empty text
/// fields, unrecognised enum values fall back as follows.
///
/// | column    | missing      | unrecognised |
/// |-----------|--------------|--------------|
/// | `species` | `other`      | `other`      |
/// | `sex`     | `None`       | `None`       |
/// | `size`    | `None`       | `None`       |
/// | `status`  | `available`  | `pending`    |
pub fn normalize_animal(raw: &Value) -> Animal {
    let species = text(raw, "species")
        .and_then(|s| s.parse().ok())
        .unwrap_or(Species::Other);
    let sex = text(raw, "sex").and_then(|s| s.parse::<Sex>().ok());
    let size = text(raw, "size").and_then(|s| s.parse::<Size>().ok());
    let status = match text(raw, "status") {
        None => AnimalStatus::Available,
        Some(s) => s.parse().unwrap_or(AnimalStatus::Pending),
    };

    Animal {
        id: id_of(raw),
        name: text_or_empty(raw, "name"),
        species,
        sex,
        age: text_or_empty(raw, "age"),
        size,
        description: text_or_empty(raw, "description"),
        photos: raw.get("photos").map(normalize_photos).unwrap_or_default(),
        location: text_or_empty(raw, "location"),
        status,
        created_at: text(raw, "created_at").map(str::to_string),
    }
}

fn text<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key).and_then(Value::as_str)
}

fn text_or_empty(raw: &Value, key: &str) -> String {
    text(raw, key).unwrap_or_default().to_string()
}

/// Ids are uuids in the hosted store but plain integers in older dumps.
fn id_of(raw: &Value) -> String {
    match raw.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
