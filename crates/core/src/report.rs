//! Bulk submission outcome types.
//!
//! A submission run always produces a [`SubmissionReport`]; failures
//! are aggregated per row, never surfaced as bare errors.

use serde::Serialize;

use crate::types::RowId;

// ---------------------------------------------------------------------------
// Batch outcome
// ---------------------------------------------------------------------------

/// Terminal state of one bulk submission run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    /// No row was attempted (empty store, or cancelled before the
    /// first row).
    Empty,
    AllSucceeded,
    PartialFailure,
    AllFailed,
}

impl BatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::AllSucceeded => "all_succeeded",
            Self::PartialFailure => "partial_failure",
            Self::AllFailed => "all_failed",
        }
    }

    /// Parse an outcome string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "empty" => Some(Self::Empty),
            "all_succeeded" => Some(Self::AllSucceeded),
            "partial_failure" => Some(Self::PartialFailure),
            "all_failed" => Some(Self::AllFailed),
            _ => None,
        }
    }

    pub const ALL: &'static [&'static str] =
        &["empty", "all_succeeded", "partial_failure", "all_failed"];

    /// Derive the outcome from attempt counts.
    pub fn from_counts(attempted: usize, succeeded: usize, failed: usize) -> Self {
        if attempted == 0 {
            Self::Empty
        } else if failed == 0 {
            Self::AllSucceeded
        } else if succeeded == 0 {
            Self::AllFailed
        } else {
            Self::PartialFailure
        }
    }
}

impl std::fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// One failed row of a submission run.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    pub row_id: RowId,
    /// 1-based position at the moment the run started.
    pub display_index: usize,
    /// Bill number when present, else `"Row N"`.
    pub label: String,
    pub message: String,
}

impl std::fmt::Display for RowFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label, self.message)
    }
}

/// Aggregate result of one bulk submission run.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    /// Rows in the store when the run started.
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// `true` when the run was stopped between rows; unattempted rows
    /// are neither succeeded nor failed.
    pub cancelled: bool,
    pub outcome: BatchOutcome,
    pub failures: Vec<RowFailure>,
}

impl SubmissionReport {
    pub fn new(total: usize, succeeded: usize, failures: Vec<RowFailure>, cancelled: bool) -> Self {
        let failed = failures.len();
        Self {
            total,
            succeeded,
            failed,
            cancelled,
            outcome: BatchOutcome::from_counts(succeeded + failed, succeeded, failed),
            failures,
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
