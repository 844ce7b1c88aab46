//! Extraction response to editable rows.
//!
//! One policy for every bill count: a failed recognition yields a
//! notice and zero rows, a clean zero-count yields a different notice,
//! and anything else yields one row per usable slot. Single-bill
//! extractions go through the same path as multi-bill ones.

use chequeflow_client::messages::ExtractResponse;
use chequeflow_core::bill::RecognizedBill;
use chequeflow_core::cities::CityDirectory;
use chequeflow_core::row::{BillRow, RowDefaults};

/// Notice text when the extraction service reports failure without a
/// message of its own.
pub const DEFAULT_FAILURE_NOTICE: &str = "Cheque recognition failed";

/// Result of feeding one extraction response into the workflow.
///
/// No variant aborts the session; callers surface the notice and stay
/// interactive.
#[derive(Debug)]
pub enum IntakeOutcome {
    /// The service reported failure; the message is user-facing.
    Failed(String),
    /// Recognition ran but found no bills.
    NoBills,
    /// One row per usable slot, in wire order. Errored slots are
    /// dropped silently, so the list can be shorter than the reported
    /// count (or empty when every slot errored).
    Rows(Vec<BillRow>),
}

/// Apply the intake policy to an extraction response.
pub fn rows_from_extraction(
    response: &ExtractResponse,
    cities: &CityDirectory,
    defaults: &RowDefaults,
) -> IntakeOutcome {
    if !response.is_success {
        let message = response
            .error_message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_FAILURE_NOTICE)
            .to_string();
        tracing::warn!(message = %message, "extraction reported failure");
        return IntakeOutcome::Failed(message);
    }

    if response.total_bill_count == 0 {
        return IntakeOutcome::NoBills;
    }

    let mut dropped = 0usize;
    let rows: Vec<BillRow> = response
        .all_details()
        .cloned()
        .map(RecognizedBill::from)
        .filter(|bill| {
            if bill.is_usable() {
                true
            } else {
                dropped += 1;
                false
            }
        })
        .map(|bill| BillRow::from_recognized(&bill, cities, defaults))
        .collect();

    if dropped > 0 {
        tracing::warn!(
            dropped,
            kept = rows.len(),
            "extraction slots failed recognition and were skipped"
        );
    }
    tracing::info!(rows = rows.len(), "extraction produced editable rows");
    IntakeOutcome::Rows(rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn parse(json: &str) -> ExtractResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn failure_yields_notice_and_no_rows() {
        let response = parse(r#"{ "IsSuccess": false, "ErrorMessage": "Service down" }"#);
        let outcome =
            rows_from_extraction(&response, &CityDirectory::default(), &RowDefaults::default());
        assert_matches!(outcome, IntakeOutcome::Failed(message) if message == "Service down");
    }

    #[test]
    fn failure_without_message_uses_default_notice() {
        let response = parse(r#"{ "IsSuccess": false, "ErrorMessage": "  " }"#);
        let outcome =
            rows_from_extraction(&response, &CityDirectory::default(), &RowDefaults::default());
        assert_matches!(outcome, IntakeOutcome::Failed(message) if message == DEFAULT_FAILURE_NOTICE);
    }

    #[test]
    fn zero_count_yields_no_bills() {
        let response = parse(r#"{ "IsSuccess": true, "TotalBillCount": 0 }"#);
        let outcome =
            rows_from_extraction(&response, &CityDirectory::default(), &RowDefaults::default());
        assert_matches!(outcome, IntakeOutcome::NoBills);
    }

    #[test]
    fn errored_slots_are_dropped() {
        let response = parse(
            r#"{
                "IsSuccess": true,
                "TotalBillCount": 3,
                "FileResults": [
                    {
                        "BillDetails": [
                            { "BillNumber": "1111111" },
                            { "BillNumber": "2222222", "ErrorMessage": "QR unreadable" },
                            { "BillNumber": "3333333" }
                        ]
                    }
                ]
            }"#,
        );
        let outcome =
            rows_from_extraction(&response, &CityDirectory::default(), &RowDefaults::default());
        let rows = match outcome {
            IntakeOutcome::Rows(rows) => rows,
            other => panic!("Expected rows, got {other:?}"),
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].bill_number, "1111111");
        assert_eq!(rows[1].bill_number, "3333333");
    }

    #[test]
    fn single_bill_takes_the_same_path() {
        let response = parse(
            r#"{
                "IsSuccess": true,
                "TotalBillCount": 1,
                "FileResults": [
                    { "BillDetails": [ { "BillNumber": "0007654321", "BranchName": "Merkez / Ankara" } ] }
                ]
            }"#,
        );
        let cities = CityDirectory::new(["ANKARA"]);
        let outcome = rows_from_extraction(&response, &cities, &RowDefaults::default());
        let rows = match outcome {
            IntakeOutcome::Rows(rows) => rows,
            other => panic!("Expected rows, got {other:?}"),
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bill_number, "7654321");
        assert_eq!(rows[0].place_of_issue, "ANKARA");
    }

    #[test]
    fn all_errored_slots_yield_empty_rows() {
        let response = parse(
            r#"{
                "IsSuccess": true,
                "TotalBillCount": 2,
                "FileResults": [
                    {
                        "BillDetails": [
                            { "ErrorMessage": "blur" },
                            { "ErrorMessage": "glare" }
                        ]
                    }
                ]
            }"#,
        );
        let outcome =
            rows_from_extraction(&response, &CityDirectory::default(), &RowDefaults::default());
        assert_matches!(outcome, IntakeOutcome::Rows(rows) if rows.is_empty());
    }
}
