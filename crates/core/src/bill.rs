//! Immutable QR-recognition output.
//!
//! One [`RecognizedBill`] per bill slot the extraction endpoint
//! detected. Fields are raw as recognized; cleaning happens when a
//! slot is turned into an editable row.

use serde::{Deserialize, Serialize};

/// A single recognized bill, exactly as extraction returned it.
///
/// Created once per extraction call and never mutated. Slots that
/// failed recognition carry `error_message` and are excluded from row
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedBill {
    /// Cheque serial number (raw, uncleaned).
    pub bill_number: String,
    /// Bank account number (raw, uncleaned).
    pub account_number: String,
    pub bank_code: String,
    pub bank_branch_code: String,
    pub bank_name: String,
    /// Free-text branch string, e.g. `"Kadıköy Şubesi / İstanbul"`.
    pub branch_name: String,
    /// Party that wrote the cheque.
    pub drawer_name: String,
    pub drawer_tax_number: String,
    /// Trade-registry identifier, when the QR carries one.
    pub mersis_number: Option<String>,
    /// Raw decoded barcode payload, when requested.
    pub barcode_text: Option<String>,
    /// Index of the source image within the extraction request.
    pub image_index: Option<u32>,
    /// Set when this slot failed recognition.
    pub error_message: Option<String>,
}

impl RecognizedBill {
    /// A slot is usable only when recognition reported no error for it.
    pub fn is_usable(&self) -> bool {
        self.error_message.is_none()
    }
}

// ── Tests ────────────────────────────────────────────────────────────
