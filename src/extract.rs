// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction for uploaded files
//!
//! PDFs are rendered through the `pdftotext` system binary (poppler),
//! which emits one form-feed-separated block per page. Blank pages are
//! dropped but keep their 1-based position, so downstream chunk metadata
//! points at the real page in the source document. Plain-text and
//! markdown files pass through as a single page.

use std::path::Path;

use thiserror::Error;
use tokio::process::Command;

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "txt", "md"];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {filename}")]
    UnsupportedFileType { filename: String },

    #[error("File is not valid UTF-8: {filename}")]
    InvalidEncoding { filename: String },

    #[error("No text could be extracted from {filename}")]
    EmptyDocument { filename: String },

    #[error("Text extraction failed: {reason}")]
    Extraction { reason: String },

    #[error("I/O error during extraction: {0}")]
    Io(#[from] std::io::Error),
}

/// One page that produced text, tagged with its position in the source
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub page_num: u32,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Pages with non-blank text, in source order
    pub pages: Vec<ExtractedPage>,
    /// Total pages in the source file, blank ones included
    pub num_pages: usize,
}

impl ExtractedDocument {
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }
}

pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

pub fn is_supported(filename: &str) -> bool {
    file_extension(filename).map_or(false, |ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Extract text from an uploaded file, dispatching on its extension
pub async fn extract(filename: &str, data: &[u8]) -> Result<ExtractedDocument, ExtractError> {
    match file_extension(filename).as_deref() {
        Some("pdf") => extract_pdf(filename, data).await,
        Some("txt") | Some("md") => extract_plain(filename, data),
        _ => Err(ExtractError::UnsupportedFileType {
            filename: filename.to_string(),
        }),
    }
}

async fn extract_pdf(filename: &str, data: &[u8]) -> Result<ExtractedDocument, ExtractError> {
    let temp = tempfile::Builder::new()
        .prefix("pdf_extract_")
        .suffix(".pdf")
        .tempfile()?;
    tokio::fs::write(temp.path(), data).await?;

    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg("-enc")
        .arg("UTF-8")
        .arg(temp.path())
        .arg("-")
        .output()
        .await
        .map_err(|e| ExtractError::Extraction {
            reason: format!("failed to run pdftotext: {} (is poppler installed?)", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::warn!("pdftotext failed for {}: {}", filename, stderr.trim());
        return Err(ExtractError::Extraction {
            reason: format!("pdftotext failed: {}", stderr.trim()),
        });
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let (pages, num_pages) = split_pages(&raw);
    if pages.is_empty() {
        tracing::warn!("pdftotext extracted no text from {}", filename);
        return Err(ExtractError::EmptyDocument {
            filename: filename.to_string(),
        });
    }

    tracing::info!(
        "extracted {} pages ({} with text) from {}",
        num_pages,
        pages.len(),
        filename
    );
    Ok(ExtractedDocument { pages, num_pages })
}

fn extract_plain(filename: &str, data: &[u8]) -> Result<ExtractedDocument, ExtractError> {
    let text = std::str::from_utf8(data).map_err(|_| ExtractError::InvalidEncoding {
        filename: filename.to_string(),
    })?;

    if text.trim().is_empty() {
        return Err(ExtractError::EmptyDocument {
            filename: filename.to_string(),
        });
    }

    Ok(ExtractedDocument {
        pages: vec![ExtractedPage {
            page_num: 1,
            text: text.to_string(),
        }],
        num_pages: 1,
    })
}

/// Split pdftotext output on form feeds into per-page blocks
///
/// pdftotext terminates every page with `\f`, so a well-formed output has
/// one trailing empty segment, which is not a page. Blank pages are
/// dropped from the result but still counted in the total.
fn split_pages(raw: &str) -> (Vec<ExtractedPage>, usize) {
    let mut segments: Vec<&str> = raw.split('\u{c}').collect();
    if segments.last().map_or(false, |s| s.is_empty()) {
        segments.pop();
    }

    let num_pages = segments.len();
    let pages = segments
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| ExtractedPage {
            page_num: (i + 1) as u32,
            text: text.to_string(),
        })
        .collect();
    (pages, num_pages)
}
