//! Writes outcomes into the result document, a copy of the observed snapshot.

use crate::outcome::{OutcomeReason, PageOutcome, VariableOutcome};
use serde_json::{Map, Value, json};
use tagwatch_schema::VARIABLES_KEY;

pub(crate) fn annotate_page(document: &mut Map<String, Value>, page: &PageOutcome) {
    let page_entry = document
        .entry(page.page_id.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if !page_entry.is_object() {
        *page_entry = Value::Object(Map::new());
    }
    let Value::Object(page_map) = page_entry else {
        return;
    };

    if !page.found {
        page_map.insert("error".to_string(), json!(1));
        page_map.insert(
            "message".to_string(),
            json!(OutcomeReason::PageMissing.message()),
        );
    }

    let variables = page_map
        .entry(VARIABLES_KEY.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !variables.is_object() {
        *variables = Value::Object(Map::new());
    }
    let Value::Object(variables) = variables else {
        return;
    };

    for outcome in &page.variables {
        annotate_variable(variables, outcome);
    }
}

fn annotate_variable(variables: &mut Map<String, Value>, outcome: &VariableOutcome) {
    let record = match outcome.reason {
        OutcomeReason::Missing | OutcomeReason::PageMissing => {
            json!({"value": [""]})
        }
        OutcomeReason::Malformed => {
            let raw = outcome.actual.clone().unwrap_or(Value::Null);
            let value = if raw.is_array() { raw } else { json!([raw]) };
            json!({"value": value})
        }
        _ => variables
            .get(&outcome.variable_id)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())),
    };
    let Value::Object(mut record) = record else {
        return;
    };
    record.insert("error".to_string(), json!(outcome.reason.error_code()));
    record.insert("message".to_string(), json!(outcome.message()));
    record.insert(
        "variable_mapping".to_string(),
        json!(outcome.variable_mapping),
    );
    variables.insert(outcome.variable_id.clone(), Value::Object(record));
}
