//! REST client for the back-office cheque endpoints.
//!
//! Provides typed wire messages (PascalCase server contract) and an
//! HTTP wrapper for QR extraction, bill creation, the reference city
//! list, and PDF page rendering.

pub mod api;
pub mod messages;

pub use api::{OfficeApi, OfficeApiError};
pub use messages::{
    BillDetails, City, CreateBillRequest, ExtractRequest, ExtractResponse, FileResult,
};
