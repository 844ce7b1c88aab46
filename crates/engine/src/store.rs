//! Ordered, id-addressed collection of editable cheque rows.
//!
//! Rows keep their [`RowId`] for life; display positions are derived
//! from insertion order and shift naturally on removal. All mutation
//! goes through focused methods so callers never hold a row reference
//! across edits.

use std::collections::HashMap;

use chequeflow_core::document::{DocumentFile, DocumentKind};
use chequeflow_core::row::{BillRow, BroadcastField, FieldValue, RowField};
use chequeflow_core::types::RowId;

/// The editable row collection for one batch session.
///
/// Rows never disappear except through [`remove`](RowStore::remove),
/// [`remove_many`](RowStore::remove_many) and
/// [`clear`](RowStore::clear).
#[derive(Debug, Default)]
pub struct RowStore {
    rows: HashMap<RowId, BillRow>,
    /// Display order; every id has an entry in `rows`.
    order: Vec<RowId>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one row, preserving display order. Returns its id.
    pub fn insert(&mut self, row: BillRow) -> RowId {
        let id = row.id;
        self.order.push(id);
        self.rows.insert(id, row);
        id
    }

    /// Append a batch of rows at once (one extraction's worth).
    pub fn extend(&mut self, rows: Vec<BillRow>) {
        for row in rows {
            self.insert(row);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: RowId) -> Option<&BillRow> {
        self.rows.get(&id)
    }

    /// Snapshot of row ids in display order.
    pub fn ids(&self) -> Vec<RowId> {
        self.order.clone()
    }

    /// Rows in display order.
    pub fn iter(&self) -> impl Iterator<Item = &BillRow> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }

    /// 1-based display position of a row.
    pub fn display_index(&self, id: RowId) -> Option<usize> {
        self.order.iter().position(|&entry| entry == id).map(|p| p + 1)
    }

    // -- edits --

    /// Apply one field edit. Returns `false` (no-op) for an unknown id
    /// or a value kind that does not match the field.
    pub fn set_field(&mut self, id: RowId, field: RowField, value: FieldValue) -> bool {
        match self.rows.get_mut(&id) {
            Some(row) => row.set_field(field, value),
            None => false,
        }
    }

    /// Set or clear one attachment slot. Returns `false` for an
    /// unknown id.
    pub fn attach_document(
        &mut self,
        id: RowId,
        kind: DocumentKind,
        file: Option<DocumentFile>,
    ) -> bool {
        match self.rows.get_mut(&id) {
            Some(row) => {
                row.set_document(kind, file);
                true
            }
            None => false,
        }
    }

    /// Append a blank endorser entry to a row; returns the new entry's
    /// id, or `None` for an unknown row.
    pub fn add_endorser(&mut self, id: RowId) -> Option<String> {
        self.rows.get_mut(&id).map(|row| row.add_endorser())
    }

    /// Update one endorser entry of a row.
    pub fn update_endorser(
        &mut self,
        id: RowId,
        endorser_id: &str,
        name: &str,
        tax_number: &str,
    ) -> bool {
        match self.rows.get_mut(&id) {
            Some(row) => row.update_endorser(endorser_id, name, tax_number),
            None => false,
        }
    }

    /// Remove one endorser entry of a row. Refused when it is the
    /// row's last remaining entry.
    pub fn remove_endorser(&mut self, id: RowId, endorser_id: &str) -> bool {
        match self.rows.get_mut(&id) {
            Some(row) => row.remove_endorser(endorser_id),
            None => false,
        }
    }

    /// Copy the first row's value for `field` onto every row, the
    /// first included. Returns the number of rows written. Repeating a
    /// broadcast is idempotent.
    pub fn broadcast_from_first(&mut self, field: BroadcastField) -> usize {
        let Some(first_id) = self.order.first().copied() else {
            return 0;
        };
        let Some(value) = self.rows.get(&first_id).map(|row| row.broadcast_value(field)) else {
            return 0;
        };
        let target = field.as_row_field();
        let mut written = 0;
        for id in &self.order {
            if let Some(row) = self.rows.get_mut(id) {
                if row.set_field(target, value.clone()) {
                    written += 1;
                }
            }
        }
        written
    }

    // -- removal --

    /// Remove one row. Later rows keep their ids; display indices
    /// shift down.
    pub fn remove(&mut self, id: RowId) -> Option<BillRow> {
        let row = self.rows.remove(&id)?;
        self.order.retain(|&entry| entry != id);
        Some(row)
    }

    /// Remove a set of rows (submission pruning). Returns how many were
    /// actually removed.
    pub fn remove_many(&mut self, ids: &[RowId]) -> usize {
        let mut removed = 0;
        for &id in ids {
            if self.rows.remove(&id).is_some() {
                removed += 1;
            }
        }
        self.order.retain(|entry| self.rows.contains_key(entry));
        removed
    }

    /// Drop every row (fully successful batch, or explicit reset).
    pub fn clear(&mut self) {
        self.rows.clear();
        self.order.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
