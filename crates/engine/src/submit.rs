//! Sequential bulk submission (PRD-31).
//!
//! Rows go to the back office strictly one at a time, in display
//! order. Each row is validated, assembled, projected, and submitted;
//! failures are aggregated into the report instead of aborting the
//! run. Fully successful batches clear the store, partial ones prune
//! only the successful rows so the rest can be corrected and
//! resubmitted by hand. There is no automatic retry.

use tokio_util::sync::CancellationToken;

use chequeflow_client::api::{OfficeApi, OfficeApiError};
use chequeflow_client::messages::{BillUpload, CreateBillRequest, WireDocument};
use chequeflow_core::document::DocumentFile;
use chequeflow_core::report::{RowFailure, SubmissionReport};
use chequeflow_core::types::CompanyId;

use crate::assemble::assemble;
use crate::progress::{ProgressBus, ProgressEvent};
use crate::store::RowStore;

/// Seam for the bill creation endpoint.
///
/// [`OfficeApi`] is the production implementation; tests drive the
/// orchestrator with scripted fakes.
pub trait SubmitBills: Send + Sync {
    /// Submit one bill creation request.
    fn submit(
        &self,
        request: &CreateBillRequest,
    ) -> impl std::future::Future<Output = Result<(), OfficeApiError>> + Send;
}

impl SubmitBills for OfficeApi {
    fn submit(
        &self,
        request: &CreateBillRequest,
    ) -> impl std::future::Future<Output = Result<(), OfficeApiError>> + Send {
        self.create_bill(request)
    }
}

/// Sequential per-row submission orchestrator.
///
/// Owns the progress bus and a cancellation token; callers subscribe
/// via [`events`](BulkSubmitter::events) and stop a run between rows
/// via [`cancellation_token`](BulkSubmitter::cancellation_token).
pub struct BulkSubmitter<S> {
    submitter: S,
    events: ProgressBus,
    cancel: CancellationToken,
}

impl<S: SubmitBills> BulkSubmitter<S> {
    pub fn new(submitter: S) -> Self {
        Self {
            submitter,
            events: ProgressBus::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// The progress bus for this submitter's runs.
    pub fn events(&self) -> &ProgressBus {
        &self.events
    }

    /// A handle that stops the current run between rows when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Submit every row in display order, one at a time.
    ///
    /// Always returns a report; no per-row error escapes the loop.
    /// Terminal bookkeeping:
    ///
    /// - every row succeeded: the store is cleared.
    /// - partial failure: successful rows are pruned, failed rows stay
    ///   for correction and manual resubmission.
    /// - every row failed: the store is untouched.
    /// - cancelled: completed successes are pruned, unattempted rows
    ///   stay and are not counted as failures.
    pub async fn submit_all(
        &self,
        store: &mut RowStore,
        shared: Option<&DocumentFile>,
        company_id: CompanyId,
    ) -> SubmissionReport {
        let ids = store.ids();
        let total = ids.len();
        if total == 0 {
            tracing::warn!("bulk submission requested with no rows");
            return SubmissionReport::new(0, 0, Vec::new(), false);
        }

        tracing::info!(total, "starting bulk submission");
        self.events.publish(ProgressEvent::BatchStarted { total });

        let mut succeeded_ids: Vec<_> = Vec::new();
        let mut failures: Vec<RowFailure> = Vec::new();
        let mut cancelled = false;

        for (index, &id) in ids.iter().enumerate() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                tracing::info!(attempted = index, total, "bulk submission cancelled");
                self.events.publish(ProgressEvent::BatchCancelled {
                    attempted: index,
                    total,
                });
                break;
            }

            let display_index = index + 1;
            let Some(row) = store.get(id) else { continue };
            let label = row.label(display_index);

            if let Err(err) = row.validate_for_submission() {
                let message = err.to_string();
                tracing::warn!(row = display_index, label = %label, message = %message, "row failed validation");
                self.events.publish(ProgressEvent::RowFailed {
                    row_id: id,
                    display_index,
                    label: label.clone(),
                    message: message.clone(),
                });
                failures.push(RowFailure {
                    row_id: id,
                    display_index,
                    label,
                    message,
                });
                continue;
            }

            let assembled = assemble(row, shared);
            let request = CreateBillRequest {
                company_id,
                bill_list: vec![BillUpload::from_row(row, &assembled.documents)],
                multiple_bill_document: assembled.shared.as_ref().map(WireDocument::from),
                is_multiple_bill: assembled.uses_shared(),
            };

            match self.submitter.submit(&request).await {
                Ok(()) => {
                    tracing::info!(row = display_index, label = %label, "row submitted");
                    self.events.publish(ProgressEvent::RowSubmitted {
                        row_id: id,
                        display_index,
                        label,
                    });
                    succeeded_ids.push(id);
                }
                Err(err) => {
                    let message = err.display_message();
                    tracing::warn!(row = display_index, label = %label, message = %message, "row rejected");
                    self.events.publish(ProgressEvent::RowFailed {
                        row_id: id,
                        display_index,
                        label: label.clone(),
                        message: message.clone(),
                    });
                    failures.push(RowFailure {
                        row_id: id,
                        display_index,
                        label,
                        message,
                    });
                }
            }
        }

        let succeeded = succeeded_ids.len();
        if !cancelled && succeeded == total {
            store.clear();
        } else {
            store.remove_many(&succeeded_ids);
        }

        let report = SubmissionReport::new(total, succeeded, failures, cancelled);
        if !cancelled {
            self.events.publish(ProgressEvent::BatchCompleted {
                outcome: report.outcome,
                succeeded: report.succeeded,
                failed: report.failed,
            });
        }
        tracing::info!(
            total,
            succeeded = report.succeeded,
            failed = report.failed,
            outcome = %report.outcome,
            "bulk submission finished"
        );
        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chequeflow_core::report::BatchOutcome;

    struct AlwaysOk;

    impl SubmitBills for AlwaysOk {
        fn submit(
            &self,
            _request: &CreateBillRequest,
        ) -> impl std::future::Future<Output = Result<(), OfficeApiError>> + Send {
            std::future::ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn empty_store_reports_empty_without_events() {
        let submitter = BulkSubmitter::new(AlwaysOk);
        let mut rx = submitter.events().subscribe();
        let mut store = RowStore::new();

        let report = submitter.submit_all(&mut store, None, 1).await;

        assert_eq!(report.outcome, BatchOutcome::Empty);
        assert_eq!(report.total, 0);
        assert!(!report.cancelled);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn pre_cancelled_token_stops_before_first_row() {
        let submitter = BulkSubmitter::new(AlwaysOk);
        submitter.cancellation_token().cancel();

        let mut store = RowStore::new();
        let bill = chequeflow_core::RecognizedBill {
            bill_number: "1234567".to_string(),
            account_number: "100".to_string(),
            bank_code: "0062".to_string(),
            bank_branch_code: "1001".to_string(),
            bank_name: "Garanti".to_string(),
            branch_name: String::new(),
            drawer_name: "Acme Ltd".to_string(),
            drawer_tax_number: "1234567890".to_string(),
            mersis_number: None,
            barcode_text: None,
            image_index: None,
            error_message: None,
        };
        store.insert(chequeflow_core::BillRow::from_recognized(
            &bill,
            &chequeflow_core::CityDirectory::default(),
            &chequeflow_core::row::RowDefaults::default(),
        ));

        let report = submitter.submit_all(&mut store, None, 1).await;

        assert!(report.cancelled);
        assert_eq!(report.outcome, BatchOutcome::Empty);
        assert_eq!(store.len(), 1);
    }
}
