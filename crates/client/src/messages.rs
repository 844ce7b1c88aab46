//! Wire types for the back-office cheque endpoints.
//!
//! The server contract is PascalCase throughout, with one historical
//! exception: the bill creation flag is `isMultipleBill`. Domain types
//! stay snake_case; every rename lives here at the serialization
//! boundary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use chequeflow_core::bill::RecognizedBill;
use chequeflow_core::document::BillDocument;
use chequeflow_core::row::BillRow;
use chequeflow_core::types::CompanyId;

/// Fallback text when a rejection body carries no usable message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Submission failed with an unknown error";

// ---------------------------------------------------------------------------
// QR extraction
// ---------------------------------------------------------------------------

/// One image of an extraction request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtractFile {
    pub file_name: String,
    /// Base64-encoded image content.
    pub base64_file: String,
}

/// Request body for `POST /bills/extract`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtractRequest {
    pub is_multiple: bool,
    pub include_barcode_texts: bool,
    pub files: Vec<ExtractFile>,
}

/// One recognized bill slot, as the server serializes it. The legacy
/// API omits or nulls fields freely, so everything is optional here;
/// conversion into [`RecognizedBill`] fills the blanks.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillDetails {
    #[serde(default)]
    pub bill_number: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub bank_code: Option<String>,
    #[serde(default)]
    pub bank_branch_code: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub drawer_name: Option<String>,
    #[serde(default)]
    pub drawer_tax_number: Option<String>,
    #[serde(default)]
    pub mersis_number: Option<String>,
    #[serde(default)]
    pub barcode_text: Option<String>,
    #[serde(default)]
    pub image_index: Option<u32>,
    /// Present when this slot failed recognition.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl From<BillDetails> for RecognizedBill {
    fn from(details: BillDetails) -> Self {
        Self {
            bill_number: details.bill_number.unwrap_or_default(),
            account_number: details.account_number.unwrap_or_default(),
            bank_code: details.bank_code.unwrap_or_default(),
            bank_branch_code: details.bank_branch_code.unwrap_or_default(),
            bank_name: details.bank_name.unwrap_or_default(),
            branch_name: details.branch_name.unwrap_or_default(),
            drawer_name: details.drawer_name.unwrap_or_default(),
            drawer_tax_number: details.drawer_tax_number.unwrap_or_default(),
            mersis_number: details.mersis_number,
            barcode_text: details.barcode_text,
            image_index: details.image_index,
            error_message: details.error_message,
        }
    }
}

/// Per-input-file slice of an extraction response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileResult {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub bill_details: Vec<BillDetails>,
}

/// Response body of `POST /bills/extract`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtractResponse {
    pub is_success: bool,
    #[serde(default)]
    pub total_bill_count: u32,
    #[serde(default)]
    pub file_results: Vec<FileResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ExtractResponse {
    /// All bill slots across every file result, in wire order.
    pub fn all_details(&self) -> impl Iterator<Item = &BillDetails> {
        self.file_results.iter().flat_map(|f| f.bill_details.iter())
    }
}

// ---------------------------------------------------------------------------
// Bill creation
// ---------------------------------------------------------------------------

/// One reference endorser on the wire. Local entry ids never leave the
/// client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireEndorser {
    pub name: String,
    pub tax_number: String,
}

/// One document of a bill upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireDocument {
    pub file_name: String,
    pub file_type: String,
    /// Base64-encoded content.
    pub base64_file: String,
    /// `"FrontImage"`, `"BackImage"` or `"Invoice"`.
    pub document_type: String,
}

impl From<&BillDocument> for WireDocument {
    fn from(doc: &BillDocument) -> Self {
        Self {
            file_name: doc.file_name.clone(),
            file_type: doc.file_extension.clone(),
            base64_file: doc.content.clone(),
            document_type: doc.kind.as_str().to_string(),
        }
    }
}

/// Flattened upload projection of one row. Built fresh per submission
/// attempt; never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillUpload {
    pub drawer_name: String,
    pub drawer_tax_number: String,
    pub place_of_issue: String,
    pub bill_number: String,
    pub account_number: String,
    pub bank_code: String,
    pub bank_branch_code: String,
    pub bank_name: String,
    pub branch_name: String,
    pub mersis_number: Option<String>,
    /// Decimal string, e.g. `"1500.00"`.
    pub payable_amount: String,
    /// ISO date, e.g. `"2026-03-15"`.
    pub payment_due_date: String,
    pub currency_code: String,
    pub endorser_name: String,
    pub endorser_tax_number: String,
    pub reference_endorser_name: String,
    pub reference_endorser_tax_number: String,
    /// Entries with a blank tax number are already filtered out.
    pub bill_reference_endorsers: Vec<WireEndorser>,
    pub documents: Vec<WireDocument>,
    pub image_index: Option<u32>,
}

/// Cheques are TRY-denominated; the server still wants the code spelled
/// out on every upload.
pub const DEFAULT_CURRENCY_CODE: &str = "TRY";

impl BillUpload {
    /// Project an editable row and its assembled documents onto the
    /// wire shape.
    pub fn from_row(row: &BillRow, documents: &[BillDocument]) -> Self {
        Self {
            drawer_name: row.drawer_name.clone(),
            drawer_tax_number: row.drawer_tax_number.clone(),
            place_of_issue: row.place_of_issue.clone(),
            bill_number: row.bill_number.clone(),
            account_number: row.account_number.clone(),
            bank_code: row.bank_code.clone(),
            bank_branch_code: row.bank_branch_code.clone(),
            bank_name: row.bank_name.clone(),
            branch_name: row.branch_name.clone(),
            mersis_number: row.mersis_number.clone(),
            payable_amount: row
                .payable_amount
                .map(|amount| amount.to_string())
                .unwrap_or_default(),
            payment_due_date: format_due_date(row.due_date),
            currency_code: DEFAULT_CURRENCY_CODE.to_string(),
            endorser_name: row.endorser_name.clone(),
            endorser_tax_number: row.endorser_tax_number.clone(),
            reference_endorser_name: row.reference_endorser_name.clone(),
            reference_endorser_tax_number: row.reference_endorser_tax_number.clone(),
            bill_reference_endorsers: row
                .submittable_endorsers()
                .map(|endorser| WireEndorser {
                    name: endorser.name.clone(),
                    tax_number: endorser.tax_number.clone(),
                })
                .collect(),
            documents: documents.iter().map(WireDocument::from).collect(),
            image_index: row.image_index,
        }
    }
}

fn format_due_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Request body for `POST /bills`. One row per call; the shared
/// fallback document rides at this level, never inside the per-row
/// document list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBillRequest {
    pub company_id: CompanyId,
    pub bill_list: Vec<BillUpload>,
    pub multiple_bill_document: Option<WireDocument>,
    #[serde(rename = "isMultipleBill")]
    pub is_multiple_bill: bool,
}

// ---------------------------------------------------------------------------
// Rejection bodies
// ---------------------------------------------------------------------------

/// Error body shape the back office returns on non-2xx bill creation.
/// Field presence varies by server-side failure path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiFailure {
    #[serde(rename = "FriendlyMessage", default)]
    pub friendly_message: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "message", default)]
    pub message: Option<String>,
}

impl ApiFailure {
    /// The user-facing message, by preference: `FriendlyMessage`, then
    /// `Title`, then `message`, then the fixed fallback.
    pub fn display_message(&self) -> String {
        [&self.friendly_message, &self.title, &self.message]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_ERROR_MESSAGE)
            .to_string()
    }
}

/// Extract the preferred user-facing message from a raw rejection body.
///
/// Bodies that are not the documented JSON shape fall through to the
/// fixed fallback rather than leaking server internals into the report.
pub fn error_message_from_body(body: &str) -> String {
    serde_json::from_str::<ApiFailure>(body)
        .map(|failure| failure.display_message())
        .unwrap_or_else(|_| UNKNOWN_ERROR_MESSAGE.to_string())
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// One entry of the reference city list (`GET /cities`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct City {
    pub name: String,
}

// ---------------------------------------------------------------------------
// PDF pages
// ---------------------------------------------------------------------------

/// Request body for `POST /documents/pdf-page`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PdfPageRequest {
    pub file_name: String,
    /// Base64-encoded PDF content.
    pub base64_file: String,
    /// 1-based page number.
    pub page_number: u32,
}

/// Response body of `POST /documents/pdf-page`: one page rendered to an
/// opaque raster image.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PdfPageResponse {
    #[serde(default)]
    pub file_name: Option<String>,
    /// Base64-encoded image content.
    pub base64_file: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chequeflow_core::document::{DocumentFile, DocumentKind};
    use chequeflow_core::row::{Endorser, RowDefaults};
    use chequeflow_core::CityDirectory;
    use rust_decimal::Decimal;

    // -- extraction response parsing --

    #[test]
    fn test_parse_extract_response() {
        let json = r#"{
            "IsSuccess": true,
            "TotalBillCount": 3,
            "FileResults": [
                {
                    "FileName": "batch-1.png",
                    "BillDetails": [
                        {
                            "BillNumber": "0001234567",
                            "AccountNumber": "000987",
                            "BankCode": "0062",
                            "BankBranchCode": "1001",
                            "BankName": "Garanti",
                            "BranchName": "Merkez / Ankara",
                            "DrawerName": "Acme Ltd",
                            "DrawerTaxNumber": "1234567890",
                            "ImageIndex": 0
                        },
                        {
                            "BillNumber": null,
                            "ErrorMessage": "QR unreadable"
                        }
                    ]
                },
                {
                    "FileName": "batch-2.png",
                    "BillDetails": [
                        { "BillNumber": "7654321", "ImageIndex": 1 }
                    ]
                }
            ]
        }"#;

        let response: ExtractResponse = serde_json::from_str(json).unwrap();
        assert!(response.is_success);
        assert_eq!(response.total_bill_count, 3);
        assert_eq!(response.all_details().count(), 3);
        let errored: Vec<_> = response
            .all_details()
            .filter(|d| d.error_message.is_some())
            .collect();
        assert_eq!(errored.len(), 1);
    }

    #[test]
    fn test_parse_extract_failure_response() {
        let json = r#"{ "IsSuccess": false, "ErrorMessage": "Service unavailable" }"#;
        let response: ExtractResponse = serde_json::from_str(json).unwrap();
        assert!(!response.is_success);
        assert_eq!(response.total_bill_count, 0);
        assert_eq!(response.error_message.as_deref(), Some("Service unavailable"));
    }

    #[test]
    fn test_bill_details_into_recognized_fills_blanks() {
        let details = BillDetails {
            bill_number: Some("123".to_string()),
            account_number: None,
            bank_code: None,
            bank_branch_code: None,
            bank_name: None,
            branch_name: None,
            drawer_name: None,
            drawer_tax_number: None,
            mersis_number: None,
            barcode_text: None,
            image_index: Some(2),
            error_message: None,
        };
        let bill = RecognizedBill::from(details);
        assert_eq!(bill.bill_number, "123");
        assert_eq!(bill.account_number, "");
        assert_eq!(bill.image_index, Some(2));
        assert!(bill.is_usable());
    }

    // -- request serialization --

    #[test]
    fn test_extract_request_wire_keys() {
        let request = ExtractRequest {
            is_multiple: true,
            include_barcode_texts: false,
            files: vec![ExtractFile {
                file_name: "cheques.png".to_string(),
                base64_file: "aGVsbG8=".to_string(),
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["IsMultiple"], true);
        assert_eq!(value["IncludeBarcodeTexts"], false);
        assert_eq!(value["Files"][0]["FileName"], "cheques.png");
        assert_eq!(value["Files"][0]["Base64File"], "aGVsbG8=");
    }

    fn sample_row() -> BillRow {
        let bill = chequeflow_core::RecognizedBill {
            bill_number: "0001234567".to_string(),
            account_number: "000987".to_string(),
            bank_code: "0062".to_string(),
            bank_branch_code: "1001".to_string(),
            bank_name: "Garanti".to_string(),
            branch_name: "Kadıköy / İstanbul".to_string(),
            drawer_name: "Acme Ltd".to_string(),
            drawer_tax_number: "1234567890".to_string(),
            mersis_number: None,
            barcode_text: None,
            image_index: Some(0),
            error_message: None,
        };
        let cities = CityDirectory::new(["İSTANBUL"]);
        let defaults = RowDefaults {
            payable_amount: Some(Decimal::new(150_000, 2)),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 15),
        };
        BillRow::from_recognized(&bill, &cities, &defaults)
    }

    #[test]
    fn test_bill_upload_projection() {
        let mut row = sample_row();
        row.endorsers = vec![
            Endorser {
                id: "a".to_string(),
                name: "Endorser A".to_string(),
                tax_number: "11111111111".to_string(),
            },
            Endorser {
                id: "b".to_string(),
                name: "No tax".to_string(),
                tax_number: "  ".to_string(),
            },
        ];
        let file = DocumentFile::new("front.png", b"img".to_vec());
        let documents = vec![BillDocument::from_file(&file, DocumentKind::FrontImage)];

        let upload = BillUpload::from_row(&row, &documents);
        assert_eq!(upload.payable_amount, "1500.00");
        assert_eq!(upload.payment_due_date, "2026-03-15");
        assert_eq!(upload.currency_code, "TRY");
        assert_eq!(upload.bill_number, "1234567");
        assert_eq!(upload.place_of_issue, "İSTANBUL");
        assert_eq!(upload.bill_reference_endorsers.len(), 1);
        assert_eq!(upload.bill_reference_endorsers[0].tax_number, "11111111111");
        assert_eq!(upload.documents.len(), 1);
        assert_eq!(upload.documents[0].document_type, "FrontImage");
        assert_eq!(upload.documents[0].file_type, "png");
    }

    #[test]
    fn test_create_request_wire_keys() {
        let row = sample_row();
        let request = CreateBillRequest {
            company_id: 42,
            bill_list: vec![BillUpload::from_row(&row, &[])],
            multiple_bill_document: None,
            is_multiple_bill: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["CompanyId"], 42);
        assert!(value["BillList"].is_array());
        assert!(value["MultipleBillDocument"].is_null());
        // Historical casing exception on the flag.
        assert_eq!(value["isMultipleBill"], false);
        assert!(value.get("IsMultipleBill").is_none());
        assert_eq!(value["BillList"][0]["PayableAmount"], "1500.00");
        assert_eq!(value["BillList"][0]["PaymentDueDate"], "2026-03-15");
    }

    // -- rejection bodies --

    #[test]
    fn test_display_message_prefers_friendly() {
        let failure: ApiFailure = serde_json::from_str(
            r#"{ "FriendlyMessage": "Limit aşıldı", "Title": "Error", "message": "raw" }"#,
        )
        .unwrap();
        assert_eq!(failure.display_message(), "Limit aşıldı");
    }

    #[test]
    fn test_display_message_falls_back_in_order() {
        let title_only: ApiFailure =
            serde_json::from_str(r#"{ "Title": "Doğrulama hatası" }"#).unwrap();
        assert_eq!(title_only.display_message(), "Doğrulama hatası");

        let message_only: ApiFailure =
            serde_json::from_str(r#"{ "message": "stack trace" }"#).unwrap();
        assert_eq!(message_only.display_message(), "stack trace");

        let empty: ApiFailure = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(empty.display_message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn test_display_message_skips_blank_fields() {
        let failure: ApiFailure =
            serde_json::from_str(r#"{ "FriendlyMessage": "  ", "Title": "Gerçek mesaj" }"#)
                .unwrap();
        assert_eq!(failure.display_message(), "Gerçek mesaj");
    }

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(
            error_message_from_body(r#"{ "FriendlyMessage": "Kota doldu" }"#),
            "Kota doldu"
        );
        assert_eq!(
            error_message_from_body("<html>gateway timeout</html>"),
            UNKNOWN_ERROR_MESSAGE
        );
        assert_eq!(error_message_from_body(""), UNKNOWN_ERROR_MESSAGE);
    }

    // -- reference data --

    #[test]
    fn test_parse_city_list() {
        let cities: Vec<City> =
            serde_json::from_str(r#"[{ "Name": "İSTANBUL", "PlateCode": 34 }, { "Name": "ANKARA" }]"#)
                .unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].name, "İSTANBUL");
    }

    // -- pdf pages --

    #[test]
    fn test_pdf_page_request_wire_keys() {
        let request = PdfPageRequest {
            file_name: "bundle.pdf".to_string(),
            base64_file: "cGRm".to_string(),
            page_number: 1,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["FileName"], "bundle.pdf");
        assert_eq!(value["Base64File"], "cGRm");
        assert_eq!(value["PageNumber"], 1);
    }
}
