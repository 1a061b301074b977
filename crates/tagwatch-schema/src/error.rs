//! Format errors raised by the definition validator.

use serde::Serialize;
use thiserror::Error;

/// Which structural rule a document violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatErrorKind {
    /// The top-level mapping has no pages.
    EmptyDocument,
    /// The top-level value is not a mapping.
    DocumentNotObject,
    PageNotObject,
    MissingVariables,
    VariablesNotObject,
    VariableNotObject,
    /// A required definition field (`value`, `type`, `length`, `required`) is absent.
    MissingField,
    ValueNotList,
    InvalidType,
    LengthNotInteger,
    RequiredNotBoolean,
}

impl FormatErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyDocument => "empty_document",
            Self::DocumentNotObject => "document_not_object",
            Self::PageNotObject => "page_not_object",
            Self::MissingVariables => "missing_variables",
            Self::VariablesNotObject => "variables_not_object",
            Self::VariableNotObject => "variable_not_object",
            Self::MissingField => "missing_field",
            Self::ValueNotList => "value_not_list",
            Self::InvalidType => "invalid_type",
            Self::LengthNotInteger => "length_not_integer",
            Self::RequiredNotBoolean => "required_not_boolean",
        }
    }
}

/// The first structural violation found in a definition or snapshot document.
///
/// `page`, `variable` and `field` locate the defect; the rendered message
/// repeats them so a bare `Display` is enough to find it.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct FormatError {
    pub kind: FormatErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl FormatError {
    pub fn document(kind: FormatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            page: None,
            variable: None,
            field: None,
            message: message.into(),
        }
    }

    pub fn page(kind: FormatErrorKind, page: &str, detail: &str) -> Self {
        Self {
            kind,
            page: Some(page.to_string()),
            variable: None,
            field: None,
            message: format!("page `{page}`: {detail}"),
        }
    }

    pub fn variable(
        kind: FormatErrorKind,
        page: &str,
        variable: &str,
        field: Option<&str>,
        detail: &str,
    ) -> Self {
        Self {
            kind,
            page: Some(page.to_string()),
            variable: Some(variable.to_string()),
            field: field.map(str::to_string),
            message: format!("page `{page}`, variable `{variable}`: {detail}"),
        }
    }
}
