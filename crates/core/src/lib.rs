//! Pure domain logic for the cheque digitization workflow.
//!
//! This crate has no network or database dependencies. It provides:
//!
//! - [`bill`] — immutable QR-recognition output records.
//! - [`row`] — the editable cheque row entity and its field-cleaning rules.
//! - [`cities`] — place-of-issue resolution from free-text branch names.
//! - [`document`] — attachment kinds and upload document payloads.
//! - [`transform`] — rotate/crop raster transforms for scanned cheques.
//! - [`codec`] — base64 helpers for transport payloads.
//! - [`report`] — bulk submission outcome types.

pub mod bill;
pub mod cities;
pub mod codec;
pub mod document;
pub mod error;
pub mod report;
pub mod row;
pub mod transform;
pub mod types;

pub use bill::RecognizedBill;
pub use cities::CityDirectory;
pub use document::{BillDocument, DocumentFile, DocumentKind};
pub use error::CoreError;
pub use report::{BatchOutcome, RowFailure, SubmissionReport};
pub use row::{BillRow, BroadcastField, Endorser, FieldValue, RowDefaults, RowField};
pub use types::RowId;
