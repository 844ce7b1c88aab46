//! `chequeflow` -- batch cheque digitization driver.
//!
//! Reads scanned cheque images, sends them to the QR extraction
//! endpoint, builds editable rows with batch defaults applied, and
//! bulk-submits them one at a time, printing per-row progress and a
//! final report. Rows that fail stay unsent; rerun with corrected
//! inputs to retry them.
//!
//! # Environment variables
//!
//! | Variable                        | Required | Default | Description                        |
//! |---------------------------------|----------|---------|------------------------------------|
//! | `CHEQUEFLOW_API_URL`            | yes      | --      | Back-office base URL               |
//! | `CHEQUEFLOW_HTTP_TIMEOUT_SECS`  | no       | `30`    | Per-request timeout in seconds     |

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chequeflow_client::api::OfficeApi;
use chequeflow_core::cities::CityDirectory;
use chequeflow_core::document::{split_file_name, DocumentFile};
use chequeflow_core::report::{BatchOutcome, SubmissionReport};
use chequeflow_core::row::RowDefaults;
use chequeflow_core::transform::{format_for_extension, transform_bytes};
use chequeflow_engine::{
    rows_from_extraction, BulkSubmitter, IntakeOutcome, ProgressEvent, RowStore,
};

/// Default per-request HTTP timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser)]
#[command(name = "chequeflow")]
#[command(about = "Extract cheques from scanned images and bulk-submit them")]
struct Args {
    /// Scanned cheque images (png/jpeg/webp), processed as one batch
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Company the bills are created under
    #[arg(long)]
    company_id: i64,

    /// Payable amount applied to every extracted row
    #[arg(long)]
    amount: Option<Decimal>,

    /// Due date (YYYY-MM-DD) applied to every extracted row
    #[arg(long)]
    due_date: Option<chrono::NaiveDate>,

    /// Rotate every image clockwise by this many degrees before extraction
    #[arg(long, default_value_t = 0.0)]
    rotate: f64,

    /// PDF whose rendered page backs rows without their own attachments
    #[arg(long)]
    shared_pdf: Option<PathBuf>,

    /// 1-based page of the shared PDF to render
    #[arg(long, default_value_t = 1)]
    pdf_page: u32,

    /// Treat each image as a single cheque instead of a multi-cheque sheet
    #[arg(long)]
    single: bool,

    /// Ask the extraction endpoint to include raw barcode text
    #[arg(long)]
    barcode_texts: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chequeflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let base_url = std::env::var("CHEQUEFLOW_API_URL")
        .context("CHEQUEFLOW_API_URL environment variable is required")?;
    let timeout_secs: u64 = std::env::var("CHEQUEFLOW_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build the HTTP client")?;
    let api = OfficeApi::with_client(client, base_url);

    let mut files = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let mut file = DocumentFile::from_path(path)
            .with_context(|| format!("failed to read image {}", path.display()))?;
        if args.rotate != 0.0 {
            let (_, extension) = split_file_name(&file.file_name);
            let format = format_for_extension(&extension)
                .with_context(|| format!("cannot rotate {}", path.display()))?;
            file.bytes = transform_bytes(&file.bytes, args.rotate, None, format)
                .with_context(|| format!("failed to rotate {}", path.display()))?;
        }
        files.push(file);
    }

    let shared = match &args.shared_pdf {
        Some(path) => {
            let pdf = DocumentFile::from_path(path)
                .with_context(|| format!("failed to read PDF {}", path.display()))?;
            let page = api
                .pdf_page_image(&pdf, args.pdf_page)
                .await
                .context("failed to render the shared PDF page")?;
            tracing::info!(file = %page.file_name, "shared fallback page ready");
            Some(page)
        }
        None => None,
    };

    // Reference data; a failure degrades to an empty directory and
    // blank place-of-issue values.
    let cities = match api.list_cities().await {
        Ok(list) => CityDirectory::new(list.into_iter().map(|city| city.name)),
        Err(e) => {
            tracing::warn!(error = %e, "city list unavailable");
            CityDirectory::default()
        }
    };

    tracing::info!(files = files.len(), "requesting extraction");
    let response = match api
        .extract_bills(&files, !args.single, args.barcode_texts)
        .await
    {
        Ok(response) => response,
        Err(e) => anyhow::bail!("extraction request failed: {}", e.display_message()),
    };

    let defaults = RowDefaults {
        payable_amount: args.amount,
        due_date: args.due_date,
    };
    let rows = match rows_from_extraction(&response, &cities, &defaults) {
        IntakeOutcome::Failed(notice) => anyhow::bail!("extraction failed: {notice}"),
        IntakeOutcome::NoBills => {
            println!("No cheques were recognized in the provided images.");
            return Ok(());
        }
        IntakeOutcome::Rows(rows) => rows,
    };

    let mut store = RowStore::new();
    store.extend(rows);
    if store.is_empty() {
        println!("Every recognized cheque slot was unreadable; nothing to submit.");
        return Ok(());
    }
    tracing::info!(rows = store.len(), "batch ready for submission");

    let submitter = BulkSubmitter::new(api);

    // Ctrl-C stops the run after the cheque currently in flight.
    let cancel = submitter.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping after the current cheque");
            cancel.cancel();
        }
    });

    let mut events = submitter.events().subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ProgressEvent::BatchStarted { total } => {
                    println!("Submitting {total} cheque(s)...");
                }
                ProgressEvent::RowSubmitted {
                    display_index,
                    label,
                    ..
                } => {
                    println!("  [{display_index}] {label}: submitted");
                }
                ProgressEvent::RowFailed {
                    display_index,
                    label,
                    message,
                    ..
                } => {
                    println!("  [{display_index}] {label}: failed: {message}");
                }
                ProgressEvent::BatchCompleted { .. } | ProgressEvent::BatchCancelled { .. } => {
                    break;
                }
            }
        }
    });

    let report = submitter
        .submit_all(&mut store, shared.as_ref(), args.company_id)
        .await;
    let _ = printer.await;

    print_summary(&report);
    if report.has_failures() || report.cancelled {
        std::process::exit(1);
    }
    Ok(())
}

fn print_summary(report: &SubmissionReport) {
    println!();
    match report.outcome {
        BatchOutcome::Empty => println!("Nothing was submitted."),
        BatchOutcome::AllSucceeded => {
            println!("All {} cheque(s) submitted.", report.succeeded);
        }
        BatchOutcome::PartialFailure => {
            println!(
                "{} of {} cheque(s) submitted; {} kept for correction:",
                report.succeeded, report.total, report.failed
            );
            for failure in &report.failures {
                println!("  {failure}");
            }
        }
        BatchOutcome::AllFailed => {
            println!("No cheque was submitted:");
            for failure in &report.failures {
                println!("  {failure}");
            }
        }
    }
    if report.cancelled {
        let unattempted = report.total - report.succeeded - report.failed;
        println!("Run cancelled; {unattempted} cheque(s) were not attempted.");
    }
}
