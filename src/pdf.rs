//! PDF text extraction.
//!
//! A thin wrapper over `pdf-extract`. Parsing is CPU-bound and the parser
//! may panic on malformed input, so it runs on the blocking pool and panics
//! are reported as extraction errors.

use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Separator placed between the text of consecutive pages.
pub const PAGE_SEPARATOR: &str = " ";

/// Join per-page text, keeping a separator slot for pages without text.
pub fn join_pages(pages: &[String]) -> String {
    pages.join(PAGE_SEPARATOR)
}

/// Extract the text of every page of the PDF at `path`.
pub async fn extract_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(AppError::Extract(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let owned: PathBuf = path.to_path_buf();
    let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&owned))
        .await
        .map_err(|e| AppError::Extract(format!("PDF parser aborted: {}", e)))?
        .map_err(|e| AppError::Extract(e.to_string()))?;

    debug!("Extracted {} pages from {}", pages.len(), path.display());
    let text = join_pages(&pages);
    info!("Extracted {} characters of text", text.chars().count());
    Ok(text)
}

/// Minimal single-page PDF showing `text` in Helvetica, for tests.
#[cfg(test)]
pub fn sample_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 24 Tf 72 720 Td ({}) Tj ET", text);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_start = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_start
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}
