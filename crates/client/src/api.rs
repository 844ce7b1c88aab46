//! REST API client for the back-office cheque endpoints.
//!
//! Wraps QR extraction, bill creation, the reference city list, and
//! PDF page rendering using [`reqwest`]. Timeouts are a client
//! concern: callers that need one pass a configured [`reqwest::Client`]
//! via [`OfficeApi::with_client`].

use chequeflow_core::codec;
use chequeflow_core::document::DocumentFile;

use crate::messages::{
    City, CreateBillRequest, ExtractFile, ExtractRequest, ExtractResponse, PdfPageRequest,
    PdfPageResponse,
};

/// HTTP client for one back-office deployment.
pub struct OfficeApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the back-office REST layer.
#[derive(Debug, thiserror::Error)]
pub enum OfficeApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response carried an undecodable payload.
    #[error("Response payload invalid: {0}")]
    Payload(#[from] chequeflow_core::CoreError),
}

impl OfficeApiError {
    /// User-facing text for a submission report entry. Rejection bodies
    /// go through the documented message-preference chain; transport
    /// errors render as-is.
    pub fn display_message(&self) -> String {
        match self {
            Self::Api { body, .. } => crate::messages::error_message_from_body(body),
            other => other.to_string(),
        }
    }
}

impl OfficeApi {
    /// Create a new API client.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `https://office.example.com/api`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (connection pooling, timeouts, proxies).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Send one or more cheque images for QR extraction.
    ///
    /// Sends a `POST /bills/extract` request. The response reports
    /// per-slot recognition results; transport and HTTP failures are
    /// errors, a parseable `IsSuccess: false` body is not.
    pub async fn extract_bills(
        &self,
        files: &[DocumentFile],
        multiple: bool,
        include_barcode_texts: bool,
    ) -> Result<ExtractResponse, OfficeApiError> {
        let body = ExtractRequest {
            is_multiple: multiple,
            include_barcode_texts,
            files: files
                .iter()
                .map(|file| ExtractFile {
                    file_name: file.file_name.clone(),
                    base64_file: codec::encode(&file.bytes),
                })
                .collect(),
        };

        let response = self
            .client
            .post(format!("{}/bills/extract", self.base_url))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Create one bill.
    ///
    /// Sends a `POST /bills` request with a single-element `BillList`.
    /// Rejections surface as [`OfficeApiError::Api`] carrying the raw
    /// body; use [`OfficeApiError::display_message`] for report text.
    pub async fn create_bill(&self, request: &CreateBillRequest) -> Result<(), OfficeApiError> {
        let response = self
            .client
            .post(format!("{}/bills", self.base_url))
            .json(request)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Fetch the reference city list.
    ///
    /// Sends a `GET /cities` request. Fetched once per session; callers
    /// degrade to an empty directory on failure.
    pub async fn list_cities(&self) -> Result<Vec<City>, OfficeApiError> {
        let response = self
            .client
            .get(format!("{}/cities", self.base_url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Render one page of a PDF to a raster image.
    ///
    /// Sends a `POST /documents/pdf-page` request and decodes the
    /// returned base64 into a [`DocumentFile`]. The page content is
    /// opaque to this client.
    pub async fn pdf_page_image(
        &self,
        file: &DocumentFile,
        page_number: u32,
    ) -> Result<DocumentFile, OfficeApiError> {
        let body = PdfPageRequest {
            file_name: file.file_name.clone(),
            base64_file: codec::encode(&file.bytes),
            page_number,
        };

        let response = self
            .client
            .post(format!("{}/documents/pdf-page", self.base_url))
            .json(&body)
            .send()
            .await?;

        let page: PdfPageResponse = Self::parse_response(response).await?;
        let bytes = codec::decode(&page.base64_file)?;
        let file_name = page
            .file_name
            .unwrap_or_else(|| format!("{}-page-{}.png", file.file_name, page_number));
        Ok(DocumentFile { file_name, bytes })
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`OfficeApiError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, OfficeApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(OfficeApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, OfficeApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), OfficeApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
