use crate::definition::{
    Definition, LengthRule, PageDefinition, TypeTag, VARIABLES_KEY, VariableDefinition,
};
use crate::error::{FormatError, FormatErrorKind};
use serde_json::{Map, Value};

/// Check a document against the definition schema without keeping the result.
///
/// Pages and variables are visited in document order; the first violation is
/// returned.
pub fn validate(document: &Value) -> Result<(), FormatError> {
    parse_definition(document).map(|_| ())
}

/// Validate a document and convert it into a typed [`Definition`].
pub fn parse_definition(document: &Value) -> Result<Definition, FormatError> {
    let root = document.as_object().ok_or_else(|| {
        FormatError::document(
            FormatErrorKind::DocumentNotObject,
            "document must be a mapping of pages",
        )
    })?;
    if root.is_empty() {
        return Err(FormatError::document(
            FormatErrorKind::EmptyDocument,
            "no elements available",
        ));
    }

    let mut pages = Vec::with_capacity(root.len());
    for (page_id, page_raw) in root {
        pages.push(parse_page(page_id, page_raw)?);
    }
    Ok(Definition::new(pages))
}

fn parse_page(page_id: &str, raw: &Value) -> Result<PageDefinition, FormatError> {
    let page = raw.as_object().ok_or_else(|| {
        FormatError::page(FormatErrorKind::PageNotObject, page_id, "must be a mapping")
    })?;
    let variables_raw = page.get(VARIABLES_KEY).ok_or_else(|| {
        FormatError::page(
            FormatErrorKind::MissingVariables,
            page_id,
            "missing `variables` key",
        )
    })?;
    let variables_map = variables_raw.as_object().ok_or_else(|| {
        FormatError::page(
            FormatErrorKind::VariablesNotObject,
            page_id,
            "`variables` must be a mapping",
        )
    })?;

    let mut variables = Vec::with_capacity(variables_map.len());
    for (variable_id, variable_raw) in variables_map {
        variables.push(parse_variable(page_id, variable_id, variable_raw)?);
    }
    Ok(PageDefinition {
        id: page_id.to_string(),
        variables,
    })
}

fn parse_variable(
    page_id: &str,
    variable_id: &str,
    raw: &Value,
) -> Result<VariableDefinition, FormatError> {
    let fail = |kind, field: Option<&str>, detail: &str| {
        FormatError::variable(kind, page_id, variable_id, field, detail)
    };

    let record = raw
        .as_object()
        .ok_or_else(|| fail(FormatErrorKind::VariableNotObject, None, "must be a mapping"))?;

    let allowed = required_field(record, "value", &fail)?
        .as_array()
        .ok_or_else(|| {
            fail(
                FormatErrorKind::ValueNotList,
                Some("value"),
                "`value` must be a list",
            )
        })?
        .clone();

    let type_raw = required_field(record, "type", &fail)?;
    let type_tag = type_raw.as_str().and_then(TypeTag::parse).ok_or_else(|| {
        fail(
            FormatErrorKind::InvalidType,
            Some("type"),
            &format!("`type` must be one of \"int\", \"float\", \"str\", \"*\"; got {type_raw}"),
        )
    })?;

    let length_raw = required_field(record, "length", &fail)?;
    let length = length_raw
        .as_i64()
        .and_then(LengthRule::from_i64)
        .ok_or_else(|| {
            fail(
                FormatErrorKind::LengthNotInteger,
                Some("length"),
                &format!("`length` must be -1 or a non-negative integer; got {length_raw}"),
            )
        })?;

    let required_raw = required_field(record, "required", &fail)?;
    let Value::Bool(required) = required_raw else {
        return Err(fail(
            FormatErrorKind::RequiredNotBoolean,
            Some("required"),
            &format!("`required` must be true or false; got {required_raw}"),
        ));
    };

    Ok(VariableDefinition {
        id: variable_id.to_string(),
        allowed,
        type_tag,
        length,
        required: *required,
    })
}

fn required_field<'a, F>(
    record: &'a Map<String, Value>,
    field: &str,
    fail: &F,
) -> Result<&'a Value, FormatError>
where
    F: Fn(FormatErrorKind, Option<&str>, &str) -> FormatError,
{
    record.get(field).ok_or_else(|| {
        fail(
            FormatErrorKind::MissingField,
            Some(field),
            &format!("missing `{field}`"),
        )
    })
}
