//! Turning uploaded files into text.
//!
//! PDF text comes from `pdf_oxide` (the `pdf` feature, on by default); plain
//! text formats are decoded as UTF-8. Anything else is rejected before it
//! reaches the chunker.

use crate::types::{AppError, Result};
use std::path::{Path, PathBuf};

/// Extensions decoded as UTF-8 text.
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "csv", "json", "html"];

/// Extract the full text of the file at `path`, dispatching on its extension.
pub async fn extract_text(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => extract_pdf(path.to_path_buf()).await?,
        ext if TEXT_EXTENSIONS.contains(&ext) => decode_text(tokio::fs::read(path).await?)?,
        "" => {
            return Err(AppError::Extraction(
                "file has no extension, cannot determine its type".to_string(),
            ))
        }
        other => {
            return Err(AppError::Extraction(format!(
                "unsupported file type: .{}",
                other
            )))
        }
    };

    if text.trim().is_empty() {
        return Err(AppError::Extraction("no extractable text".to_string()));
    }

    tracing::debug!(path = %path.display(), chars = text.chars().count(), "Extracted text");
    Ok(text)
}

/// Decode bytes as UTF-8, tolerating a leading byte-order mark.
pub fn decode_text(bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes)
        .map_err(|e| AppError::Extraction(format!("file is not valid UTF-8: {}", e)))?;
    Ok(text
        .strip_prefix('\u{feff}')
        .map(str::to_string)
        .unwrap_or(text))
}

#[cfg(feature = "pdf")]
async fn extract_pdf(path: PathBuf) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let mut doc = pdf_oxide::PdfDocument::open(&path)
            .map_err(|e| AppError::Extraction(format!("cannot open PDF: {}", e)))?;
        let pages = doc
            .page_count()
            .map_err(|e| AppError::Extraction(format!("cannot read PDF pages: {}", e)))?;

        let mut text = String::new();
        for page in 0..pages {
            let page_text = doc
                .extract_text(page)
                .map_err(|e| AppError::Extraction(format!("page {}: {}", page + 1, e)))?;
            if !text.is_empty() && !page_text.is_empty() {
                text.push('\n');
            }
            text.push_str(&page_text);
        }
        Ok(text)
    })
    .await
    .map_err(|e| AppError::Internal(format!("PDF extraction task failed: {}", e)))?
}

#[cfg(not(feature = "pdf"))]
async fn extract_pdf(_path: PathBuf) -> Result<String> {
    Err(AppError::Extraction(
        "PDF support requires the 'pdf' feature".to_string(),
    ))
}

/// Strip directories and anything outside `[A-Za-z0-9._-]` from a client
/// supplied file name.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `{unix_ts}_{sanitized name}`
pub fn upload_filename(original: &str, unix_ts: i64) -> String {
    format!("{}_{}", unix_ts, sanitize_filename(original))
}

/// Persist upload bytes under `dir` and return the stored path.
pub async fn save_upload(dir: &Path, original: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(upload_filename(original, chrono::Utc::now().timestamp()));
    tokio::fs::write(&path, bytes).await?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Saved upload");
    Ok(path)
}
