//! Typed definition document.
//!
//! A [`Definition`] is only ever built by [`crate::parse_definition`], so every
//! value of this type already satisfies the shape rules of the validator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value, json};
use sha2::{Digest, Sha256};

/// Key under which a page lists its variables.
pub const VARIABLES_KEY: &str = "variables";

/// Declared type of a tracking variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "str")]
    Str,
    /// Accept any observed type tag, including unknown ones.
    #[serde(rename = "*")]
    Any,
}

impl TypeTag {
    pub const ALL: [TypeTag; 4] = [Self::Int, Self::Float, Self::Str, Self::Any];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Any => "*",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == raw)
    }

    /// Whether an observed type tag satisfies this declaration.
    pub fn accepts(self, observed: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            declared => observed == Some(declared.as_str()),
        }
    }
}

/// Declared length of a tracking variable; `-1` in documents means unchecked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthRule {
    Unchecked,
    Exact(u64),
}

impl LengthRule {
    pub fn from_i64(raw: i64) -> Option<Self> {
        match raw {
            -1 => Some(Self::Unchecked),
            n if n >= 0 => Some(Self::Exact(n as u64)),
            _ => None,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Self::Unchecked => -1,
            Self::Exact(n) => n as i64,
        }
    }

    /// Observed lengths compare by numeric value, so `2.0` satisfies `2`.
    pub fn accepts(self, observed: Option<&Value>) -> bool {
        match self {
            Self::Unchecked => true,
            Self::Exact(n) => observed.is_some_and(|value| same_value(value, &json!(n))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    pub id: String,
    /// Allowed values; empty accepts anything.
    pub allowed: Vec<Value>,
    pub type_tag: TypeTag,
    pub length: LengthRule,
    /// When false, presence is still checked but content is not.
    pub required: bool,
}

impl VariableDefinition {
    pub fn allows(&self, observed: &Value) -> bool {
        self.allowed.is_empty()
            || self
                .allowed
                .iter()
                .any(|allowed| same_value(allowed, observed))
    }

    pub fn to_value(&self) -> Value {
        json!({
            "value": self.allowed,
            "type": self.type_tag.as_str(),
            "length": self.length.as_i64(),
            "required": self.required,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageDefinition {
    pub id: String,
    pub variables: Vec<VariableDefinition>,
}

impl PageDefinition {
    pub fn variable(&self, id: &str) -> Option<&VariableDefinition> {
        self.variables.iter().find(|variable| variable.id == id)
    }
}

/// Validated baseline: pages in document order, each with its variables in
/// document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pages: Vec<PageDefinition>,
}

impl Definition {
    pub(crate) fn new(pages: Vec<PageDefinition>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[PageDefinition] {
        &self.pages
    }

    pub fn page(&self, id: &str) -> Option<&PageDefinition> {
        self.pages.iter().find(|page| page.id == id)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of variables declared across all pages.
    pub fn variable_count(&self) -> usize {
        self.pages.iter().map(|page| page.variables.len()).sum()
    }

    /// Restrict the definition to a single page.
    pub fn focus(&self, page_id: &str) -> Option<Definition> {
        self.page(page_id).map(|page| Definition {
            pages: vec![page.clone()],
        })
    }

    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        for page in &self.pages {
            let mut variables = Map::new();
            for variable in &page.variables {
                variables.insert(variable.id.clone(), variable.to_value());
            }
            let mut page_value = Map::new();
            page_value.insert(VARIABLES_KEY.to_string(), Value::Object(variables));
            root.insert(page.id.clone(), Value::Object(page_value));
        }
        Value::Object(root)
    }

    /// Content digest over the key-sorted compact JSON rendering.
    pub fn digest(&self) -> String {
        let canonical = sort_json_value(&self.to_value()).to_string();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("def1_{:x}", hasher.finalize())
    }
}

/// JSON equality with numbers compared by value: `1` equals `1.0`.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => same_number(a, b),
        _ => a == b,
    }
}

fn same_number(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    a.as_f64() == b.as_f64()
}

fn sort_json_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            let mut sorted = Map::new();
            for key in keys {
                if let Some(item) = map.get(key) {
                    sorted.insert(key.clone(), sort_json_value(item));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_json_value).collect()),
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_definition;

    fn sample() -> Definition {
        parse_definition(&json!({
            "Home": {"variables": {
                "lang": {"value": ["en", "de"], "type": "str", "length": -1, "required": true},
                "pageName": {"value": [], "type": "*", "length": 4, "required": false}
            }},
            "Search": {"variables": {
                "hits": {"value": [], "type": "int", "length": -1, "required": true}
            }}
        }))
        .expect("sample definition should parse")
    }

    #[test]
    fn type_tag_wildcard_accepts_unknown_tags() {
        assert!(TypeTag::Any.accepts(Some("bool")));
        assert!(TypeTag::Any.accepts(None));
        assert!(TypeTag::Str.accepts(Some("str")));
        assert!(!TypeTag::Str.accepts(Some("int")));
        assert!(!TypeTag::Int.accepts(None));
    }

    #[test]
    fn length_rule_round_trips_sentinel() {
        assert_eq!(LengthRule::from_i64(-1), Some(LengthRule::Unchecked));
        assert_eq!(LengthRule::from_i64(3), Some(LengthRule::Exact(3)));
        assert_eq!(LengthRule::from_i64(-2), None);
        assert_eq!(LengthRule::Unchecked.as_i64(), -1);
        assert!(LengthRule::Unchecked.accepts(None));
        assert!(LengthRule::Exact(2).accepts(Some(&json!(2))));
        assert!(LengthRule::Exact(2).accepts(Some(&json!(2.0))));
        assert!(!LengthRule::Exact(2).accepts(Some(&json!(2.5))));
        assert!(!LengthRule::Exact(2).accepts(Some(&json!(3))));
        assert!(!LengthRule::Exact(2).accepts(Some(&json!("2"))));
        assert!(!LengthRule::Exact(2).accepts(None));
    }

    #[test]
    fn allowed_numbers_match_by_value() {
        let definition = parse_definition(&json!({"Home": {"variables": {
            "v1": {"value": [1, "2"], "type": "int", "length": -1, "required": true}
        }}}))
        .expect("definition should parse");
        let v1 = definition.pages()[0].variable("v1").expect("v1 variable");
        assert!(v1.allows(&json!(1)));
        assert!(v1.allows(&json!(1.0)));
        assert!(v1.allows(&json!("2")));
        assert!(!v1.allows(&json!(2)));
        assert!(!v1.allows(&json!("1")));
    }

    #[test]
    fn counts_and_focus() {
        let definition = sample();
        assert_eq!(definition.page_count(), 2);
        assert_eq!(definition.variable_count(), 3);

        let focused = definition.focus("Search").expect("Search is defined");
        assert_eq!(focused.page_count(), 1);
        assert_eq!(focused.pages()[0].id, "Search");
        assert!(definition.focus("Checkout").is_none());
    }

    #[test]
    fn to_value_reparses_to_same_definition() {
        let definition = sample();
        let reparsed = parse_definition(&definition.to_value()).expect("rendered form is valid");
        assert_eq!(reparsed, definition);
    }

    #[test]
    fn digest_ignores_key_order() {
        let a = parse_definition(&json!({
            "Home": {"variables": {
                "a": {"value": [], "type": "str", "length": -1, "required": true},
                "b": {"value": [], "type": "str", "length": -1, "required": true}
            }}
        }))
        .expect("a should parse");
        let b = parse_definition(&json!({
            "Home": {"variables": {
                "b": {"value": [], "type": "str", "length": -1, "required": true},
                "a": {"value": [], "type": "str", "length": -1, "required": true}
            }}
        }))
        .expect("b should parse");
        assert!(a.digest().starts_with("def1_"));
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), sample().digest());
    }
}
