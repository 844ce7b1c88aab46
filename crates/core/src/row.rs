//! The editable cheque row and its field-cleaning rules (PRD-31).
//!
//! Rows are built in bulk from recognition output, edited in memory,
//! and projected to upload payloads at submission time. This module
//! provides:
//!
//! - Cleaning functions applied once at row creation (`clean_bill_number`,
//!   `clean_account_number`)
//! - [`BillRow`] with typed field addressing for edits and broadcasts
//! - [`Endorser`] bookkeeping and the submission-time filter
//! - The submission validation check

use rust_decimal::Decimal;

use crate::bill::RecognizedBill;
use crate::cities::CityDirectory;
use crate::document::{DocumentFile, DocumentKind};
use crate::error::CoreError;
use crate::types::RowId;

// ── Constants ────────────────────────────────────────────────────────

/// Cheque serial numbers keep only their trailing digits.
pub const BILL_NUMBER_MAX_LEN: usize = 7;

// ── Cleaning rules ───────────────────────────────────────────────────

fn remove_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

fn strip_leading_zeros(s: &str) -> &str {
    let stripped = s.trim_start_matches('0');
    if stripped.is_empty() {
        "0"
    } else {
        stripped
    }
}

/// Clean a recognized bill number: drop all whitespace, strip leading
/// zeros (an all-zero value becomes `"0"`), keep only the last
/// [`BILL_NUMBER_MAX_LEN`] characters.
pub fn clean_bill_number(raw: &str) -> String {
    let no_ws = remove_whitespace(raw);
    let stripped = strip_leading_zeros(&no_ws);
    let count = stripped.chars().count();
    if count > BILL_NUMBER_MAX_LEN {
        stripped.chars().skip(count - BILL_NUMBER_MAX_LEN).collect()
    } else {
        stripped.to_string()
    }
}

/// Clean a recognized account number: drop all whitespace, strip
/// leading zeros (an all-zero value becomes `"0"`). No truncation.
pub fn clean_account_number(raw: &str) -> String {
    let no_ws = remove_whitespace(raw);
    strip_leading_zeros(&no_ws).to_string()
}

// ── Endorser ─────────────────────────────────────────────────────────

/// One entry of a row's reference endorser list.
///
/// The id is local bookkeeping (rows are edited before any server call
/// exists to assign one) and is never serialized to the back office.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endorser {
    pub id: String,
    pub name: String,
    pub tax_number: String,
}

impl Endorser {
    /// A fresh empty entry, as seeded on row creation and on explicit add.
    pub fn blank() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: String::new(),
            tax_number: String::new(),
        }
    }

    /// Entries without a tax number are dropped before submission.
    pub fn is_submittable(&self) -> bool {
        !self.tax_number.trim().is_empty()
    }
}

// ── Field addressing ─────────────────────────────────────────────────

/// The editable fields of a row. Bank identity fields resolved at
/// recognition time are not addressable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    DrawerName,
    DrawerTaxNumber,
    PlaceOfIssue,
    BillNumber,
    AccountNumber,
    PayableAmount,
    DueDate,
    EndorserName,
    EndorserTaxNumber,
    ReferenceEndorserName,
    ReferenceEndorserTaxNumber,
}

/// A typed value for a field edit. Kind must match the target field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Amount(Option<Decimal>),
    Date(Option<chrono::NaiveDate>),
}

/// Fields that can be copied from the first row onto every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastField {
    PlaceOfIssue,
    PayableAmount,
    DueDate,
}

impl BroadcastField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlaceOfIssue => "place_of_issue",
            Self::PayableAmount => "payable_amount",
            Self::DueDate => "due_date",
        }
    }

    /// Parse a field name. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "place_of_issue" => Some(Self::PlaceOfIssue),
            "payable_amount" => Some(Self::PayableAmount),
            "due_date" => Some(Self::DueDate),
            _ => None,
        }
    }

    pub const ALL: &'static [&'static str] = &["place_of_issue", "payable_amount", "due_date"];

    /// The row field this broadcast writes to.
    pub fn as_row_field(&self) -> RowField {
        match self {
            Self::PlaceOfIssue => RowField::PlaceOfIssue,
            Self::PayableAmount => RowField::PayableAmount,
            Self::DueDate => RowField::DueDate,
        }
    }
}

impl std::fmt::Display for BroadcastField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Row ──────────────────────────────────────────────────────────────

/// Seed values applied to every row built from one extraction call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowDefaults {
    pub payable_amount: Option<Decimal>,
    pub due_date: Option<chrono::NaiveDate>,
}

/// An editable cheque row.
///
/// Built from a usable [`RecognizedBill`], addressed by a durable
/// [`RowId`], mutated through typed setters, and projected to the wire
/// only at submission time. Rows may be transiently incomplete; the
/// submission invariant is checked by [`BillRow::validate_for_submission`].
#[derive(Debug, Clone)]
pub struct BillRow {
    pub id: RowId,
    pub drawer_name: String,
    pub drawer_tax_number: String,
    /// Resolved from the branch text at creation; still editable.
    pub place_of_issue: String,
    /// Cleaned serial number.
    pub bill_number: String,
    /// Cleaned account number.
    pub account_number: String,
    pub bank_code: String,
    pub bank_branch_code: String,
    pub bank_name: String,
    pub branch_name: String,
    pub mersis_number: Option<String>,
    pub payable_amount: Option<Decimal>,
    pub due_date: Option<chrono::NaiveDate>,
    pub endorser_name: String,
    pub endorser_tax_number: String,
    pub reference_endorser_name: String,
    pub reference_endorser_tax_number: String,
    /// Ordered; always holds at least one entry.
    pub endorsers: Vec<Endorser>,
    pub front: Option<DocumentFile>,
    pub back: Option<DocumentFile>,
    pub invoice: Option<DocumentFile>,
    /// Index of the source image within the extraction request.
    pub image_index: Option<u32>,
}

impl BillRow {
    /// Build an editable row from recognition output. Infallible: field
    /// cleaning and city resolution never reject a row.
    pub fn from_recognized(
        bill: &RecognizedBill,
        cities: &CityDirectory,
        defaults: &RowDefaults,
    ) -> Self {
        Self {
            id: RowId::new(),
            drawer_name: bill.drawer_name.clone(),
            drawer_tax_number: bill.drawer_tax_number.clone(),
            place_of_issue: cities
                .resolve(&bill.branch_name)
                .map(str::to_string)
                .unwrap_or_default(),
            bill_number: clean_bill_number(&bill.bill_number),
            account_number: clean_account_number(&bill.account_number),
            bank_code: bill.bank_code.clone(),
            bank_branch_code: bill.bank_branch_code.clone(),
            bank_name: bill.bank_name.clone(),
            branch_name: bill.branch_name.clone(),
            mersis_number: bill.mersis_number.clone(),
            payable_amount: defaults.payable_amount,
            due_date: defaults.due_date,
            endorser_name: String::new(),
            endorser_tax_number: String::new(),
            reference_endorser_name: String::new(),
            reference_endorser_tax_number: String::new(),
            endorsers: vec![Endorser::blank()],
            front: None,
            back: None,
            invoice: None,
            image_index: bill.image_index,
        }
    }

    /// Apply one field edit. Returns `false` (and changes nothing) when
    /// the value kind does not match the field.
    pub fn set_field(&mut self, field: RowField, value: FieldValue) -> bool {
        match (field, value) {
            (RowField::DrawerName, FieldValue::Text(v)) => self.drawer_name = v,
            (RowField::DrawerTaxNumber, FieldValue::Text(v)) => self.drawer_tax_number = v,
            (RowField::PlaceOfIssue, FieldValue::Text(v)) => self.place_of_issue = v,
            (RowField::BillNumber, FieldValue::Text(v)) => self.bill_number = v,
            (RowField::AccountNumber, FieldValue::Text(v)) => self.account_number = v,
            (RowField::PayableAmount, FieldValue::Amount(v)) => self.payable_amount = v,
            (RowField::DueDate, FieldValue::Date(v)) => self.due_date = v,
            (RowField::EndorserName, FieldValue::Text(v)) => self.endorser_name = v,
            (RowField::EndorserTaxNumber, FieldValue::Text(v)) => self.endorser_tax_number = v,
            (RowField::ReferenceEndorserName, FieldValue::Text(v)) => {
                self.reference_endorser_name = v
            }
            (RowField::ReferenceEndorserTaxNumber, FieldValue::Text(v)) => {
                self.reference_endorser_tax_number = v
            }
            _ => return false,
        }
        true
    }

    /// Read the value a broadcast of `field` would copy from this row.
    pub fn broadcast_value(&self, field: BroadcastField) -> FieldValue {
        match field {
            BroadcastField::PlaceOfIssue => FieldValue::Text(self.place_of_issue.clone()),
            BroadcastField::PayableAmount => FieldValue::Amount(self.payable_amount),
            BroadcastField::DueDate => FieldValue::Date(self.due_date),
        }
    }

    // -- documents --

    /// Set or clear one attachment slot.
    pub fn set_document(&mut self, kind: DocumentKind, file: Option<DocumentFile>) {
        match kind {
            DocumentKind::FrontImage => self.front = file,
            DocumentKind::BackImage => self.back = file,
            DocumentKind::Invoice => self.invoice = file,
        }
    }

    /// Populated attachment slots in slot order (front, back, invoice).
    pub fn attached_documents(&self) -> Vec<(DocumentKind, &DocumentFile)> {
        let slots = [
            (DocumentKind::FrontImage, &self.front),
            (DocumentKind::BackImage, &self.back),
            (DocumentKind::Invoice, &self.invoice),
        ];
        slots
            .into_iter()
            .filter_map(|(kind, slot)| slot.as_ref().map(|file| (kind, file)))
            .collect()
    }

    /// `true` when any individual attachment is present. Rows with none
    /// fall back to the batch-level shared document at submission.
    pub fn has_any_document(&self) -> bool {
        self.front.is_some() || self.back.is_some() || self.invoice.is_some()
    }

    // -- endorsers --

    /// Append a fresh blank endorser entry and return its id.
    pub fn add_endorser(&mut self) -> String {
        let entry = Endorser::blank();
        let id = entry.id.clone();
        self.endorsers.push(entry);
        id
    }

    /// Update one endorser entry by id. Returns `false` for an unknown id.
    pub fn update_endorser(&mut self, endorser_id: &str, name: &str, tax_number: &str) -> bool {
        match self.endorsers.iter_mut().find(|e| e.id == endorser_id) {
            Some(entry) => {
                entry.name = name.to_string();
                entry.tax_number = tax_number.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove one endorser entry by id. Refused (returns `false`) when
    /// it is the last remaining entry.
    pub fn remove_endorser(&mut self, endorser_id: &str) -> bool {
        if self.endorsers.len() <= 1 {
            return false;
        }
        let before = self.endorsers.len();
        self.endorsers.retain(|e| e.id != endorser_id);
        self.endorsers.len() < before
    }

    /// Entries that survive the submission filter (non-blank tax number).
    pub fn submittable_endorsers(&self) -> impl Iterator<Item = &Endorser> {
        self.endorsers.iter().filter(|e| e.is_submittable())
    }

    // -- validation --

    /// Check the submission invariant. Rows failing it are recorded as
    /// failures without an endpoint call.
    pub fn validate_for_submission(&self) -> Result<(), CoreError> {
        let mut missing: Vec<&str> = Vec::new();
        if self.drawer_tax_number.trim().is_empty() {
            missing.push("drawer tax number");
        }
        if self.bill_number.trim().is_empty() {
            missing.push("bill number");
        }
        if self.account_number.trim().is_empty() {
            missing.push("account number");
        }
        if self.payable_amount.is_none() {
            missing.push("payable amount");
        }
        if self.due_date.is_none() {
            missing.push("due date");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Short human-facing label: the bill number when present, else the
    /// given 1-based display position.
    pub fn label(&self, display_index: usize) -> String {
        if self.bill_number.trim().is_empty() {
            format!("Row {display_index}")
        } else {
            self.bill_number.clone()
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
