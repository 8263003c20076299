//! PDF text extraction wrapper
//!
//! Wraps pdf-extract crate with error handling for:
//! - Non-PDF input (extension / magic bytes)
//! - Corrupted PDFs (pdf-extract may panic instead of returning an error)
//! - Image-only PDFs (no text; organizes to an empty result, not an error)

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use super::section_parser::{organize_with, OrganizerConfig};
use super::Section;
use crate::error::{PaperError, Result};

const PDF_MAGIC: &[u8] = b"%PDF";

/// How a page's text fragments are laid out before organizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLayout {
    /// Whole page as one line, fragments joined by single spaces
    #[default]
    Flatten,
    /// One line per text line, so headings stand on their own line
    Lines,
}

impl PageLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageLayout::Lines => "lines",
            PageLayout::Flatten => "flatten",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "lines" => Some(PageLayout::Lines),
            "flatten" => Some(PageLayout::Flatten),
            _ => None,
        }
    }
}

/// Reject anything that is not a readable `.pdf` file starting with `%PDF`
pub fn load_pdf(path: &Path) -> Result<Vec<u8>> {
    let is_pdf_name = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if !is_pdf_name {
        return Err(PaperError::InvalidFileType(path.display().to_string()));
    }

    let bytes = fs::read(path)?;
    validate_pdf_bytes(&bytes)?;
    Ok(bytes)
}

/// Check PDF magic bytes
pub fn validate_pdf_bytes(bytes: &[u8]) -> Result<()> {
    if bytes.len() < PDF_MAGIC.len() || &bytes[..PDF_MAGIC.len()] != PDF_MAGIC {
        return Err(PaperError::InvalidFileType(
            "content does not start with %PDF".to_string(),
        ));
    }
    Ok(())
}

/// Raw text of each page, in page order
pub fn extract_pages(pdf_bytes: &[u8]) -> Result<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
    }));

    match result {
        Ok(Ok(pages)) => {
            debug!("[PDF] extracted {} pages", pages.len());
            Ok(pages)
        }
        Ok(Err(e)) => Err(PaperError::Extraction(e.to_string())),
        Err(_) => Err(PaperError::Extraction(
            "PDF parser panicked (malformed document)".to_string(),
        )),
    }
}

/// Lay out one page's fragments: trimmed, blank ones dropped
pub fn layout_page(raw_page: &str, layout: PageLayout) -> String {
    let fragments = raw_page.lines().map(str::trim).filter(|f| !f.is_empty());
    match layout {
        PageLayout::Lines => fragments.collect::<Vec<_>>().join("\n"),
        PageLayout::Flatten => fragments.collect::<Vec<_>>().join(" "),
    }
}

/// Join laid-out pages with newlines, preserving page order
pub fn join_pages<S: AsRef<str>>(pages: &[S], layout: PageLayout) -> String {
    pages
        .iter()
        .map(|page| layout_page(page.as_ref(), layout))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract full text from PDF bytes
pub fn extract_text_from_pdf(pdf_bytes: &[u8], layout: PageLayout) -> Result<String> {
    validate_pdf_bytes(pdf_bytes)?;
    let pages = extract_pages(pdf_bytes)?;
    let text = join_pages(&pages, layout);

    if text.trim().is_empty() {
        warn!("[PDF] no extractable text (scanned or image-only document?)");
    }
    Ok(text)
}

/// Extract text and organize it into sections
pub fn extract_sections_from_pdf(
    pdf_bytes: &[u8],
    layout: PageLayout,
    config: &OrganizerConfig,
) -> Result<Vec<Section>> {
    let text = extract_text_from_pdf(pdf_bytes, layout)?;
    Ok(organize_with(&text, config))
}
