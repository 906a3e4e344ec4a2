use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::office;

/// Upload formats the assistant accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Docx,
    Pptx,
    Txt,
}

impl FileKind {
    pub const SUPPORTED: [&'static str; 4] = ["pptx", "docx", "pdf", "txt"];

    /// Resolve the kind from a file name's extension (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, ReadError> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "pptx" => Ok(Self::Pptx),
            "txt" => Ok(Self::Txt),
            _ => Err(ReadError::UnsupportedFileType { extension }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Txt => "txt",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Invalid file type '{extension}'. Please upload a pptx, docx, pdf, or txt file.")]
    UnsupportedFileType { extension: String },

    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),

    #[error("Failed to read {kind} document: {message}")]
    Archive { kind: FileKind, message: String },
}

pub struct FileReader;

impl FileReader {
    /// Extract plain text from raw file bytes of a known kind.
    pub fn extract(kind: FileKind, bytes: &[u8]) -> Result<String, ReadError> {
        debug!(%kind, bytes = bytes.len(), "Extracting text");

        match kind {
            FileKind::Txt => Ok(decode_text(bytes)),
            FileKind::Pdf => {
                pdf_extract::extract_text_from_mem(bytes).map_err(|e| ReadError::Pdf(e.to_string()))
            }
            FileKind::Docx => office::extract_docx(bytes),
            FileKind::Pptx => office::extract_pptx(bytes),
        }
    }
}

/// Decode a text upload.
///
/// A byte order mark decides the encoding when present. Otherwise the
/// encoding is guessed from the content, falling back to UTF-8 when the
/// guess cannot decode it cleanly.
pub fn decode_text(bytes: &[u8]) -> String {
    let encoding = match Encoding::for_bom(bytes) {
        Some((encoding, _)) => encoding,
        None => {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        }
    };

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors && encoding != UTF_8 {
        debug!(encoding = encoding.name(), "Detected encoding failed, decoding as UTF-8");
        return String::from_utf8_lossy(bytes).into_owned();
    }

    debug!(encoding = encoding.name(), "Decoded text upload");
    text.into_owned()
}
