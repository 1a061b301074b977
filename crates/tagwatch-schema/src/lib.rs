//! # Tagwatch Schema
//!
//! Shape rules for tracking-variable documents and the typed definition they
//! parse into.
//!
//! ```text
//! {
//!   "<page>": {
//!     "variables": {
//!       "<variable>": {
//!         "value": [ ... ],                      allowed values, empty = any
//!         "type": "int" | "float" | "str" | "*",
//!         "length": -1 | <LENGTH>,
//!         "required": true | false
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! [`validate`] is all-or-nothing: it stops at the first violation and returns
//! a [`FormatError`] naming the page, variable and field at fault.

pub mod definition;
pub mod error;
mod validate;

pub use definition::{
    Definition, LengthRule, PageDefinition, TypeTag, VARIABLES_KEY, VariableDefinition,
};
pub use error::{FormatError, FormatErrorKind};
pub use validate::{parse_definition, validate};
