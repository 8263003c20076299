//! Section extraction for research papers
//!
//! Pipeline: PDF bytes -> page text (`pdf_extractor`) -> ordered sections
//! (`section_parser`, using `section_classifier` for canonical headings).

pub mod pdf_extractor;
pub mod section_classifier;
pub mod section_parser;

use serde::{Deserialize, Serialize};

use crate::analysis_client::{AnalysisResult, Dependency, Entity};

/// A titled, contiguous span of a document's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Sequential within one organized document, in source order
    pub id: u32,
    pub title: String,
    /// Body lines, each terminated by '\n'
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<Entity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<Dependency>>,
}

impl Section {
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: String::new(),
            summary: None,
            entities: None,
            dependencies: None,
        }
    }

    /// Display key, e.g. "section-3"
    pub fn key(&self) -> String {
        format!("section-{}", self.id)
    }

    pub fn push_line(&mut self, line: &str) {
        self.content.push_str(line);
        self.content.push('\n');
    }

    /// True once the section holds any non-whitespace text
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// Length of the trimmed content in characters
    pub fn content_len(&self) -> usize {
        self.content.trim().chars().count()
    }

    /// Replace any previous summary
    pub fn apply_summary(&mut self, summary: String) {
        self.summary = Some(summary);
    }

    /// Replace any previous entities and dependencies
    pub fn apply_analysis(&mut self, analysis: AnalysisResult) {
        self.entities = Some(analysis.entities);
        self.dependencies = Some(analysis.dependencies);
    }
}
