//! Turn captured tracking parameters into a snapshot document.
//!
//! Snapshot acquisition hands over the raw query parameters of each page's
//! tracking request:
//!
//! ```text
//! { "<page>": { "url": "...", "variables": { "<name>": ["<raw>", ...] } } }
//! ```
//!
//! Each variable becomes a full record with an inferred type and length, so
//! the result is both a valid baseline definition and a comparable snapshot.

use serde_json::{Map, Value, json};
use tagwatch_schema::{FormatError, FormatErrorKind, TypeTag, VARIABLES_KEY};

/// Classify a raw parameter the way it would read as a literal: integer,
/// then float, then string.
pub fn infer_type(raw: &str) -> TypeTag {
    let Some(literal) = strip_digit_separators(raw.trim()) else {
        return TypeTag::Str;
    };
    if is_integer(&literal) {
        TypeTag::Int
    } else if literal.parse::<f64>().is_ok() {
        TypeTag::Float
    } else {
        TypeTag::Str
    }
}

/// Drop `_` digit separators (`1_000`). An underscore that does not sit
/// between two digits makes the text a non-number.
fn strip_digit_separators(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut literal = String::with_capacity(text.len());
    for (index, &c) in chars.iter().enumerate() {
        if c != '_' {
            literal.push(c);
            continue;
        }
        let before = index.checked_sub(1).and_then(|i| chars.get(i));
        let after = chars.get(index + 1);
        let between_digits = before.is_some_and(char::is_ascii_digit)
            && after.is_some_and(char::is_ascii_digit);
        if !between_digits {
            return None;
        }
    }
    Some(literal)
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Build the record for one captured variable from its raw values.
pub fn derive_record(values: &[String]) -> Option<Value> {
    let first = values.first()?;
    Some(json!({
        "value": values,
        "type": infer_type(first).as_str(),
        "length": first.chars().count(),
        "required": true,
    }))
}

pub fn derive_snapshot(captured: &Value) -> Result<Value, FormatError> {
    let root = captured.as_object().ok_or_else(|| {
        FormatError::document(
            FormatErrorKind::DocumentNotObject,
            "captured document must be a mapping of pages",
        )
    })?;
    if root.is_empty() {
        return Err(FormatError::document(
            FormatErrorKind::EmptyDocument,
            "no elements available",
        ));
    }

    let mut snapshot = Map::new();
    for (page_id, page_raw) in root {
        let page = page_raw.as_object().ok_or_else(|| {
            FormatError::page(FormatErrorKind::PageNotObject, page_id, "must be a mapping")
        })?;
        let variables = page
            .get(VARIABLES_KEY)
            .ok_or_else(|| {
                FormatError::page(
                    FormatErrorKind::MissingVariables,
                    page_id,
                    "missing `variables` key",
                )
            })?
            .as_object()
            .ok_or_else(|| {
                FormatError::page(
                    FormatErrorKind::VariablesNotObject,
                    page_id,
                    "`variables` must be a mapping",
                )
            })?;

        let mut records = Map::new();
        for (variable_id, raw) in variables {
            let record = raw_strings(raw)
                .and_then(|values| derive_record(&values))
                .ok_or_else(|| {
                    FormatError::variable(
                        FormatErrorKind::ValueNotList,
                        page_id,
                        variable_id,
                        Some("value"),
                        "captured value must be a non-empty list of strings",
                    )
                })?;
            records.insert(variable_id.clone(), record);
        }

        let mut derived = page.clone();
        derived.insert(VARIABLES_KEY.to_string(), Value::Object(records));
        snapshot.insert(page_id.clone(), Value::Object(derived));
    }
    Ok(Value::Object(snapshot))
}

fn raw_strings(raw: &Value) -> Option<Vec<String>> {
    raw.as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
