//! # Tagwatch Compare
//!
//! Checks an observed snapshot of tracking variables against a validated
//! baseline [`Definition`](tagwatch_schema::Definition).
//!
//! ```text
//! Definition ──► Comparator ◄── observed snapshot
//!                    │      ◄── NameMapping
//!                    ▼
//!               Comparison { document, pages, summary }
//! ```
//!
//! Regressions are outcomes, not errors: [`compare`] only fails when the
//! snapshot cannot be checked at all (bad shape, or a defined page missing
//! under [`MissingPagePolicy::Abort`]).

mod annotate;
pub mod baseline;
mod comparator;
mod error;
mod mapping;
pub mod outcome;

pub use baseline::{derive_record, derive_snapshot, infer_type};
pub use comparator::{CompareOptions, Comparator, Comparison, MissingPagePolicy, compare};
pub use error::CompareError;
pub use mapping::{NameMapping, UNMAPPED_LABEL};
pub use outcome::{OutcomeReason, PageOutcome, Summary, VariableOutcome};
