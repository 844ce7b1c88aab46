//! Row store, intake, document assembly, and bulk submission for the
//! cheque digitization workflow (PRD-31).
//!
//! - [`RowStore`] — ordered, id-addressed editable row collection.
//! - [`intake`] — extraction response to rows policy.
//! - [`assemble`] — per-row upload documents with shared-fallback routing.
//! - [`BulkSubmitter`] — sequential per-row submission with progress
//!   events, cancellation, and prune-on-success.

pub mod assemble;
pub mod intake;
pub mod progress;
pub mod store;
pub mod submit;

pub use assemble::{assemble, AssembledDocuments};
pub use intake::{rows_from_extraction, IntakeOutcome};
pub use progress::{ProgressBus, ProgressEvent};
pub use store::RowStore;
pub use submit::{BulkSubmitter, SubmitBills};
