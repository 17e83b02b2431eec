//! Brochure text extraction.
//!
//! PDFs go through `pdf-extract`; `text/*` documents are read as UTF-8.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported document type: {0}")]
    Unsupported(String),

    #[error("Document contains no text")]
    Empty,

    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    #[error("Failed to fetch document: {0}")]
    Fetch(String),

    #[error("Document exceeds {0} bytes")]
    TooLarge(usize),
}

/// An uploaded or downloaded brochure.
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl Document {
    /// Content type from the upload, else guessed from the file name.
    fn mime(&self) -> String {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
            .map(str::to_string)
            .or_else(|| {
                self.file_name
                    .as_deref()
                    .and_then(|name| mime_guess::from_path(name).first())
                    .map(|m| m.essence_str().to_string())
            })
            .unwrap_or_else(|| "application/octet-stream".to_string())
    }

    fn is_pdf(&self) -> bool {
        self.bytes.starts_with(b"%PDF") || self.mime() == "application/pdf"
    }
}

/// Extracts plain text from a document.
pub fn extract_text(doc: &Document) -> Result<String, DocumentError> {
    let text = if doc.is_pdf() {
        pdf_extract::extract_text_from_mem(&doc.bytes)
            .map_err(|e| DocumentError::Pdf(e.to_string()))?
    } else {
        let mime = doc.mime();
        if !mime.starts_with("text/") {
            return Err(DocumentError::Unsupported(mime));
        }
        String::from_utf8_lossy(&doc.bytes).into_owned()
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(DocumentError::Empty);
    }
    Ok(text.to_string())
}

/// Extracts text on the blocking pool; PDF parsing is CPU bound.
pub async fn extract_text_blocking(doc: Document) -> Result<String, DocumentError> {
    tokio::task::spawn_blocking(move || extract_text(&doc))
        .await
        .map_err(|e| DocumentError::Pdf(format!("extraction task failed: {}", e)))?
}

/// Downloads a brochure from `url`.
pub async fn fetch_document(
    client: &reqwest::Client,
    url: &str,
    max_bytes: usize,
) -> Result<Document, DocumentError> {
    let response = client
        .get(url)
        .timeout(Duration::from_secs(30))
        .send()
        .await
        .map_err(|e| DocumentError::Fetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(DocumentError::Fetch(format!(
            "{} returned {}",
            url,
            response.status()
        )));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

    let bytes = response
        .bytes()
        .await
        .map_err(|e| DocumentError::Fetch(e.to_string()))?;
    if bytes.len() > max_bytes {
        return Err(DocumentError::TooLarge(max_bytes));
    }

    let file_name = url.rsplit('/').next().map(|s| s.to_string());
    Ok(Document {
        bytes: bytes.to_vec(),
        content_type,
        file_name,
    })
}
