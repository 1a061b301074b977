//! Typed per-variable and per-page comparison outcomes.

use serde::Serialize;
use serde_json::Value;

/// Why a variable passed or failed. Exactly one reason is recorded per
/// evaluated variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeReason {
    Passed,
    NotRequired,
    Missing,
    /// The whole page was absent and the run continued past it.
    PageMissing,
    Malformed,
    TypeMismatch,
    LengthMismatch,
    ValueNotAllowed,
}

impl OutcomeReason {
    pub fn is_pass(self) -> bool {
        matches!(self, Self::Passed | Self::NotRequired)
    }

    /// `error` field value in the result document.
    pub fn error_code(self) -> u8 {
        if self.is_pass() { 0 } else { 1 }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Passed | Self::NotRequired => "test successful",
            Self::Missing => "variable not found",
            Self::PageMissing => "page not found",
            Self::Malformed => "expected a structured value",
            Self::TypeMismatch => "type mismatch",
            Self::LengthMismatch => "length mismatch",
            Self::ValueNotAllowed => "value not in allowed set",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::NotRequired => "not_required",
            Self::Missing => "missing",
            Self::PageMissing => "page_missing",
            Self::Malformed => "malformed",
            Self::TypeMismatch => "type_mismatch",
            Self::LengthMismatch => "length_mismatch",
            Self::ValueNotAllowed => "value_not_allowed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableOutcome {
    pub variable_id: String,
    pub reason: OutcomeReason,
    pub variable_mapping: String,
    /// Declared expectation that was not met.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    /// Observed value behind the failure, if any was observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
}

impl VariableOutcome {
    pub(crate) fn new(variable_id: &str, variable_mapping: &str, reason: OutcomeReason) -> Self {
        Self {
            variable_id: variable_id.to_string(),
            reason,
            variable_mapping: variable_mapping.to_string(),
            expected: None,
            actual: None,
        }
    }

    pub(crate) fn with_values(mut self, expected: Option<Value>, actual: Option<Value>) -> Self {
        self.expected = expected;
        self.actual = actual;
        self
    }

    pub fn passed(&self) -> bool {
        self.reason.is_pass()
    }

    pub fn message(&self) -> &'static str {
        self.reason.message()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOutcome {
    pub page_id: String,
    /// False when the page was absent from the observed snapshot.
    pub found: bool,
    pub variables: Vec<VariableOutcome>,
}

impl PageOutcome {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for variable in &self.variables {
            summary.record(variable);
        }
        summary
    }

    pub fn failures(&self) -> impl Iterator<Item = &VariableOutcome> {
        self.variables.iter().filter(|variable| !variable.passed())
    }
}

/// Pass/fail counters for one comparison run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
}

impl Summary {
    pub fn record(&mut self, outcome: &VariableOutcome) {
        if outcome.passed() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn merge(&mut self, other: Summary) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}
