//! Section parser for academic papers
//!
//! Splits extracted full text into ordered [`Section`]s:
//! - Canonical pass: lines classified by `section_classifier` open new sections
//! - Numbered fallback: "2.1 Related Work" style headings, used when the
//!   canonical pass produces nothing
//! - Noise filter: sections with too little body text are dropped

use log::debug;
use serde::{Deserialize, Serialize};

use super::section_classifier::{classify_with_limit, MAX_HEADING_CHARS, NUMBERED_HEADING};
use super::Section;

/// Sections whose trimmed content is this short or shorter are dropped.
pub const MIN_SECTION_CHARS: usize = 50;

const IMPLICIT_INTRODUCTION: &str = "Introduction";
const IMPLICIT_DOCUMENT: &str = "Document Content";

/// Tunable thresholds for organizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Minimum trimmed content length (exclusive) for a section to be kept
    pub min_section_chars: usize,
    /// Heading candidates must be shorter than this
    pub max_heading_chars: usize,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            min_section_chars: MIN_SECTION_CHARS,
            max_heading_chars: MAX_HEADING_CHARS,
        }
    }
}

/// Which segmentation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Canonical headings, numbered fallback only if nothing was found
    #[default]
    Auto,
    /// Numbered headings only
    Numbered,
}

/// Accumulates sections during a single scan
#[derive(Default)]
struct SectionBuilder {
    next_id: u32,
    current: Option<Section>,
    sections: Vec<Section>,
}

impl SectionBuilder {
    /// Close the current section and open a new, empty one
    fn start(&mut self, title: impl Into<String>) {
        self.flush();
        let id = self.next_id;
        self.next_id += 1;
        self.current = Some(Section::new(id, title));
    }

    /// Append to the current section; false if there is none
    fn append(&mut self, line: &str) -> bool {
        match self.current.as_mut() {
            Some(section) => {
                section.push_line(line);
                true
            }
            None => false,
        }
    }

    fn has_emitted(&self) -> bool {
        !self.sections.is_empty()
    }

    fn flush(&mut self) {
        if let Some(section) = self.current.take() {
            if section.has_content() {
                self.sections.push(section);
            }
        }
    }

    fn finish(mut self) -> Vec<Section> {
        self.flush();
        self.sections
    }
}

/// Trimmed, non-blank lines in source order
fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(str::trim).filter(|line| !line.is_empty())
}

fn retain_substantial(sections: Vec<Section>, min_section_chars: usize) -> Vec<Section> {
    let total = sections.len();
    let kept: Vec<Section> = sections
        .into_iter()
        .filter(|section| section.content_len() > min_section_chars)
        .collect();

    debug!(
        "[Organizer] kept {}/{} sections (min {} chars)",
        kept.len(),
        total,
        min_section_chars
    );
    kept
}

/// Organize text into sections with the default thresholds
pub fn organize(text: &str) -> Vec<Section> {
    organize_with(text, &OrganizerConfig::default())
}

/// Canonical-heading pass with numbered fallback
pub fn organize_with(text: &str, config: &OrganizerConfig) -> Vec<Section> {
    let mut builder = SectionBuilder::default();

    for line in content_lines(text) {
        if let Some(section_type) = classify_with_limit(line, config.max_heading_chars) {
            builder.start(section_type.title());
        } else if !builder.append(line) && !builder.has_emitted() {
            builder.start(IMPLICIT_INTRODUCTION);
            builder.append(line);
        }
    }

    let sections = builder.finish();
    if sections.is_empty() {
        debug!("[Organizer] no canonical sections, trying numbered headings");
        return organize_by_numbers_with(text, config);
    }

    retain_substantial(sections, config.min_section_chars)
}

/// Run the requested strategy
pub fn organize_with_strategy(text: &str, strategy: Strategy, config: &OrganizerConfig) -> Vec<Section> {
    match strategy {
        Strategy::Auto => organize_with(text, config),
        Strategy::Numbered => organize_by_numbers_with(text, config),
    }
}

/// Numbered-heading segmentation with the default thresholds
pub fn organize_by_numbers(text: &str) -> Vec<Section> {
    organize_by_numbers_with(text, &OrganizerConfig::default())
}

/// Segment on headings like "2." or "3.1 Related Work"
pub fn organize_by_numbers_with(text: &str, config: &OrganizerConfig) -> Vec<Section> {
    let mut builder = SectionBuilder::default();

    for line in content_lines(text) {
        match numbered_heading(line, config.max_heading_chars) {
            Some((number, label)) => builder.start(format!("{} {}", number, label)),
            None => {
                if !builder.append(line) {
                    builder.start(IMPLICIT_DOCUMENT);
                    builder.append(line);
                }
            }
        }
    }

    retain_substantial(builder.finish(), config.min_section_chars)
}

/// Split a short numbered heading into (number, label)
fn numbered_heading(line: &str, max_heading_chars: usize) -> Option<(&str, &str)> {
    if line.chars().count() >= max_heading_chars {
        return None;
    }
    let caps = NUMBERED_HEADING.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}
