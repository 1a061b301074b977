use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label reported for variables without a human-readable name.
pub const UNMAPPED_LABEL: &str = "-";

/// Variable identifier to display label, e.g. `"c1"` to `"Page name"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameMapping(BTreeMap<String, String>);

impl NameMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display label for `variable`, or [`UNMAPPED_LABEL`].
    pub fn label(&self, variable: &str) -> &str {
        self.0
            .get(variable)
            .map(String::as_str)
            .unwrap_or(UNMAPPED_LABEL)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for NameMapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(variable, label)| (variable.into(), label.into()))
                .collect(),
        )
    }
}
