//! Attachment kinds and upload document payloads.
//!
//! A cheque row can carry up to three individually attached files
//! (front scan, back scan, invoice). At submission time each populated
//! slot becomes a [`BillDocument`] with its content base64-encoded.

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Document kind
// ---------------------------------------------------------------------------

/// Which slot of a row a document fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    FrontImage,
    BackImage,
    Invoice,
}

impl DocumentKind {
    /// Wire discriminant expected by the bill creation endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FrontImage => "FrontImage",
            Self::BackImage => "BackImage",
            Self::Invoice => "Invoice",
        }
    }

    /// Parse a discriminant string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "FrontImage" => Some(Self::FrontImage),
            "BackImage" => Some(Self::BackImage),
            "Invoice" => Some(Self::Invoice),
            _ => None,
        }
    }

    /// All valid discriminants, in slot order.
    pub const ALL: &'static [&'static str] = &["FrontImage", "BackImage", "Invoice"];
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Attachment file
// ---------------------------------------------------------------------------

/// An attachment as loaded from disk or returned by the PDF page
/// endpoint. Bytes are raw; encoding happens at assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DocumentFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Load an attachment from disk, taking the file name from the path.
    pub fn from_path(path: &std::path::Path) -> Result<Self, CoreError> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }
}

/// Split a file name into `(stem, extension)`.
///
/// The extension is lowercased and carries no dot. Names without an
/// extension (or leading-dot names like `.hidden`) yield an empty
/// extension.
pub fn split_file_name(file_name: &str) -> (&str, String) {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => (&file_name[..pos], file_name[pos + 1..].to_lowercase()),
        _ => (file_name, String::new()),
    }
}

// ---------------------------------------------------------------------------
// Upload payload element
// ---------------------------------------------------------------------------

/// One document of a bill upload: base64 content plus naming metadata,
/// tagged with the slot it fills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillDocument {
    pub file_name: String,
    pub file_extension: String,
    /// Base64-encoded file content.
    pub content: String,
    pub kind: DocumentKind,
}

impl BillDocument {
    /// Encode an attachment for upload.
    pub fn from_file(file: &DocumentFile, kind: DocumentKind) -> Self {
        let (stem, extension) = split_file_name(&file.file_name);
        Self {
            file_name: stem.to_string(),
            file_extension: extension,
            content: codec::encode(&file.bytes),
            kind,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- DocumentKind tests --

    #[test]
    fn test_kind_round_trip() {
        for s in DocumentKind::ALL {
            let kind = DocumentKind::from_str(s).unwrap();
            assert_eq!(kind.as_str(), *s);
        }
    }

    #[test]
    fn test_kind_unknown_string() {
        assert_eq!(DocumentKind::from_str("Selfie"), None);
        assert_eq!(DocumentKind::from_str(""), None);
    }

    // -- split_file_name tests --

    #[test]
    fn test_split_file_name() {
        assert_eq!(split_file_name("front.PNG"), ("front", "png".to_string()));
        assert_eq!(
            split_file_name("my.cheque.jpg"),
            ("my.cheque", "jpg".to_string())
        );
        assert_eq!(split_file_name("noext"), ("noext", String::new()));
        assert_eq!(split_file_name(".hidden"), (".hidden", String::new()));
    }

    // -- BillDocument tests --

    #[test]
    fn test_from_file_encodes_and_splits() {
        let file = DocumentFile::new("scan.png", b"hello".to_vec());
        let doc = BillDocument::from_file(&file, DocumentKind::FrontImage);
        assert_eq!(doc.file_name, "scan");
        assert_eq!(doc.file_extension, "png");
        assert_eq!(doc.content, "aGVsbG8=");
        assert_eq!(doc.kind, DocumentKind::FrontImage);
    }

    #[test]
    fn test_from_path_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("back.jpg");
        std::fs::write(&path, b"jpeg-bytes").unwrap();

        let file = DocumentFile::from_path(&path).unwrap();
        assert_eq!(file.file_name, "back.jpg");
        assert_eq!(file.bytes, b"jpeg-bytes");
    }

    #[test]
    fn test_from_path_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DocumentFile::from_path(&dir.path().join("gone.png")).is_err());
    }
}
