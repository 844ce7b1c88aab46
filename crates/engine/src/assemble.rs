//! Per-row upload document assembly.
//!
//! Each populated attachment slot becomes one upload document. The
//! batch-level shared page (rendered from a bundle PDF) is routed at
//! the request level instead, and only for rows with no individual
//! attachment at all. A row never carries both.

use chequeflow_core::document::{BillDocument, DocumentFile, DocumentKind};
use chequeflow_core::row::BillRow;

/// Upload documents for one row.
///
/// Invariant: `documents` non-empty implies `shared` is `None`, and
/// vice versa. Both empty is valid (nothing attached, no shared page).
#[derive(Debug, Clone)]
pub struct AssembledDocuments {
    /// Per-row document list, in slot order.
    pub documents: Vec<BillDocument>,
    /// Request-level shared fallback, when this row uses it.
    pub shared: Option<BillDocument>,
}

impl AssembledDocuments {
    /// `true` when this row rides on the batch-level shared document.
    pub fn uses_shared(&self) -> bool {
        self.shared.is_some()
    }
}

/// Assemble the upload documents for one row.
///
/// The shared page represents the scanned cheque sheet, so it is
/// tagged as a front image on the wire.
pub fn assemble(row: &BillRow, shared: Option<&DocumentFile>) -> AssembledDocuments {
    let documents: Vec<BillDocument> = row
        .attached_documents()
        .into_iter()
        .map(|(kind, file)| BillDocument::from_file(file, kind))
        .collect();

    let shared = if documents.is_empty() {
        shared.map(|file| BillDocument::from_file(file, DocumentKind::FrontImage))
    } else {
        None
    };

    AssembledDocuments { documents, shared }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
