use serde::{Deserialize, Serialize};

/// Company scope for bill creation calls.
pub type CompanyId = i64;

/// Durable identity of an editable cheque row.
///
/// Assigned once at row creation and stable across edits and removals,
/// so callers never address rows by display position. Display indices
/// are derived from store order and used for human-facing messages only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(uuid::Uuid);

impl RowId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
