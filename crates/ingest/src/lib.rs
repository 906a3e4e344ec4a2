pub mod chunker;
pub mod office;
pub mod reader;
pub mod stats;

pub use chunker::split_text_evenly;
pub use reader::{FileKind, FileReader, ReadError};
pub use stats::{TextStats, char_length, count_tokens};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

/// Plain text pulled out of one uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub name: String,
    pub kind: FileKind,
    pub doc_id: String,
    pub text: String,
}

impl ExtractedDocument {
    pub fn stats(&self) -> TextStats {
        TextStats::of(&self.text)
    }
}

/// Generate a stable document ID from file name and content
pub fn generate_doc_id(name: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(text.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}

/// Extract an upload received as bytes (e.g. a multipart form field).
pub fn extract_upload(name: &str, bytes: &[u8]) -> Result<ExtractedDocument, ReadError> {
    let kind = FileKind::from_name(name)?;
    let text = FileReader::extract(kind, bytes)?;
    Ok(document(name, kind, text))
}

fn document(name: &str, kind: FileKind, text: String) -> ExtractedDocument {
    let doc = ExtractedDocument {
        name: name.to_string(),
        kind,
        doc_id: generate_doc_id(name, &text),
        text,
    };

    let stats = doc.stats();
    info!(
        name = %doc.name,
        doc_id = %doc.doc_id,
        kind = %doc.kind,
        approx_tokens = stats.approx_tokens,
        char_length = stats.char_length,
        "Extracted document"
    );

    doc
}
