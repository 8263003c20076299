//! Error types shared by the extractor, the analysis client and the enrichment session.
//!
//! Organization and classification are infallible; only I/O, extraction and the
//! remote service can fail.

use thiserror::Error;

use crate::enrichment::EnrichmentKind;

/// User-facing errors.
#[derive(Debug, Error)]
pub enum PaperError {
    #[error("Invalid file type: {0}. Please select a PDF file.")]
    InvalidFileType(String),

    #[error("Failed to extract text from the PDF file: {0}")]
    Extraction(String),

    #[error("Failed to generate summary. Please check if the API server is running.")]
    Summary(#[source] ClientError),

    #[error("Failed to analyze text. Please check if the API server is running.")]
    Analysis(#[source] ClientError),

    #[error("Failed to create HTTP client")]
    HttpClient(#[source] ClientError),

    #[error("A {kind} request is already running for section {section_id}")]
    RequestInFlight { section_id: u32, kind: EnrichmentKind },

    #[error("No section with id {0}")]
    UnknownSection(u32),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Underlying cause of a failed call to the analysis service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, PaperError>;
