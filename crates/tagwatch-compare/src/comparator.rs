//! Baseline comparison.
//!
//! Every variable declared in the definition is evaluated against the observed
//! snapshot by the first matching rule:
//!
//! 1. absent from the observed page: fail (`variable not found`)
//! 2. observed entry is not a mapping: fail (`expected a structured value`)
//! 3. `required` is false: pass
//! 4. declared type is not `*` and differs: fail (`type mismatch`)
//! 5. declared length is not `-1` and differs: fail (`length mismatch`)
//! 6. allowed values are non-empty and the observed value is not one: fail
//! 7. otherwise: pass
//!
//! Variables that appear only in the observed snapshot are never visited.

use crate::annotate::annotate_page;
use crate::error::CompareError;
use crate::mapping::NameMapping;
use crate::outcome::{OutcomeReason, PageOutcome, Summary, VariableOutcome};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tagwatch_schema::{
    Definition, FormatError, FormatErrorKind, PageDefinition, VARIABLES_KEY, VariableDefinition,
};
use tracing::{debug, info, warn};

/// What to do when a defined page is absent from the observed snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPagePolicy {
    /// Fail the whole run with [`CompareError::PageNotFound`].
    #[default]
    Abort,
    /// Mark every variable of the page as failed and keep going.
    MarkAndContinue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareOptions {
    pub missing_page_policy: MissingPagePolicy,
    /// Run the definition validator over the observed snapshot first.
    pub validate_observed: bool,
}

/// Result of one comparison run. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    /// Observed snapshot annotated with `error`, `message` and
    /// `variable_mapping` for every defined variable.
    pub document: Value,
    pub pages: Vec<PageOutcome>,
    pub summary: Summary,
}

impl Comparison {
    /// Failing variables with the page they belong to, in definition order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &VariableOutcome)> {
        self.pages.iter().flat_map(|page| {
            page.failures()
                .map(move |variable| (page.page_id.as_str(), variable))
        })
    }
}

/// Comparator bound to one validated baseline definition.
///
/// Holds no per-run state, so a single instance can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct Comparator {
    definition: Definition,
    options: CompareOptions,
}

impl Comparator {
    pub fn new(definition: Definition) -> Self {
        Self::with_options(definition, CompareOptions::default())
    }

    pub fn with_options(definition: Definition, options: CompareOptions) -> Self {
        Self {
            definition,
            options,
        }
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn options(&self) -> CompareOptions {
        self.options
    }

    pub fn compare(
        &self,
        observed: &Value,
        mapping: &NameMapping,
    ) -> Result<Comparison, CompareError> {
        run(&self.definition, &self.options, observed, mapping)
    }
}

/// Compare with default options: abort on a missing page, no observed-side
/// validation.
pub fn compare(
    definition: &Definition,
    observed: &Value,
    mapping: &NameMapping,
) -> Result<Comparison, CompareError> {
    run(definition, &CompareOptions::default(), observed, mapping)
}

fn run(
    definition: &Definition,
    options: &CompareOptions,
    observed: &Value,
    mapping: &NameMapping,
) -> Result<Comparison, CompareError> {
    if options.validate_observed {
        tagwatch_schema::validate(observed)?;
    }
    let observed_pages = observed.as_object().ok_or_else(|| {
        FormatError::document(
            FormatErrorKind::DocumentNotObject,
            "observed snapshot must be a mapping of pages",
        )
    })?;

    // Checked up front so an abort never leaves partial results behind.
    if options.missing_page_policy == MissingPagePolicy::Abort {
        if let Some(missing) = definition
            .pages()
            .iter()
            .find(|page| !observed_pages.contains_key(&page.id))
        {
            return Err(CompareError::PageNotFound {
                page: missing.id.clone(),
            });
        }
    }

    let mut document = observed_pages.clone();
    let mut pages = Vec::with_capacity(definition.page_count());
    let mut summary = Summary::default();

    for page in definition.pages() {
        let outcome = match observed_pages.get(&page.id) {
            Some(observed_page) => evaluate_page(page, observed_page, mapping),
            None => {
                warn!(page = %page.id, "page not found in observed snapshot");
                missing_page(page, mapping)
            }
        };
        summary.merge(outcome.summary());
        annotate_page(&mut document, &outcome);
        pages.push(outcome);
    }

    info!(
        pages = pages.len(),
        succeeded = summary.succeeded,
        failed = summary.failed,
        "comparison finished"
    );

    Ok(Comparison {
        document: Value::Object(document),
        pages,
        summary,
    })
}

fn evaluate_page(
    page: &PageDefinition,
    observed_page: &Value,
    mapping: &NameMapping,
) -> PageOutcome {
    let observed_variables = observed_page.get(VARIABLES_KEY).and_then(Value::as_object);

    let variables = page
        .variables
        .iter()
        .map(|variable| {
            let observed = observed_variables.and_then(|vars| vars.get(&variable.id));
            let outcome = evaluate_variable(variable, observed, mapping.label(&variable.id));
            debug!(
                page = %page.id,
                variable = %variable.id,
                reason = outcome.reason.as_str(),
                "variable evaluated"
            );
            outcome
        })
        .collect();

    PageOutcome {
        page_id: page.id.clone(),
        found: true,
        variables,
    }
}

fn missing_page(page: &PageDefinition, mapping: &NameMapping) -> PageOutcome {
    PageOutcome {
        page_id: page.id.clone(),
        found: false,
        variables: page
            .variables
            .iter()
            .map(|variable| {
                VariableOutcome::new(
                    &variable.id,
                    mapping.label(&variable.id),
                    OutcomeReason::PageMissing,
                )
            })
            .collect(),
    }
}

/// Apply the rule order to one variable. `label` is resolved before any rule
/// runs so every outcome carries it.
fn evaluate_variable(
    definition: &VariableDefinition,
    observed: Option<&Value>,
    label: &str,
) -> VariableOutcome {
    let outcome = |reason| VariableOutcome::new(&definition.id, label, reason);

    let Some(raw) = observed else {
        return outcome(OutcomeReason::Missing);
    };
    let Some(record) = raw.as_object() else {
        return outcome(OutcomeReason::Malformed).with_values(None, Some(raw.clone()));
    };

    if !definition.required {
        return outcome(OutcomeReason::NotRequired);
    }

    let observed_type = record.get("type");
    if !definition.type_tag.accepts(observed_type.and_then(Value::as_str)) {
        return outcome(OutcomeReason::TypeMismatch).with_values(
            Some(json!(definition.type_tag.as_str())),
            observed_type.cloned(),
        );
    }

    let observed_length = record.get("length");
    if !definition.length.accepts(observed_length) {
        return outcome(OutcomeReason::LengthMismatch).with_values(
            Some(json!(definition.length.as_i64())),
            observed_length.cloned(),
        );
    }

    if !definition.allowed.is_empty() {
        let observed_value = observed_scalar(record);
        if !observed_value.is_some_and(|value| definition.allows(value)) {
            return outcome(OutcomeReason::ValueNotAllowed).with_values(
                Some(Value::Array(definition.allowed.clone())),
                observed_value.cloned(),
            );
        }
    }

    outcome(OutcomeReason::Passed)
}

/// The observed value is a one-element list; a bare scalar is taken as is.
fn observed_scalar(record: &Map<String, Value>) -> Option<&Value> {
    match record.get("value")? {
        Value::Array(items) => items.first(),
        scalar => Some(scalar),
    }
}
