// =============================================================================
// Section Heading Classifier
// =============================================================================
//
// Decides whether a single trimmed line is the heading of one of the canonical
// paper sections:
// - abstract, introduction, literature_review, methodology, experiment,
//   results, discussion, conclusion, future_work
//
// Numbered headings ("2.", "3.1 Methods") are never classified here; they
// belong to the numbered fallback in section_parser.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Lines at or above this length are treated as body prose, not headings.
pub const MAX_HEADING_CHARS: usize = 100;

/// Leading heading number: integer, optional `.digits`, optional trailing period,
/// then whitespace and a label. Shared with the numbered fallback.
pub(crate) static NUMBERED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?\.?)\s+(.+)$").unwrap()
});

/// Canonical section types, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionType {
    Abstract,
    Introduction,
    LiteratureReview,
    Methodology,
    Experiment,
    Results,
    Discussion,
    Conclusion,
    FutureWork,
}

impl SectionType {
    /// Fixed iteration order. The first type with a matching alias wins.
    pub const ALL: [SectionType; 9] = [
        SectionType::Abstract,
        SectionType::Introduction,
        SectionType::LiteratureReview,
        SectionType::Methodology,
        SectionType::Experiment,
        SectionType::Results,
        SectionType::Discussion,
        SectionType::Conclusion,
        SectionType::FutureWork,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Abstract => "abstract",
            SectionType::Introduction => "introduction",
            SectionType::LiteratureReview => "literature_review",
            SectionType::Methodology => "methodology",
            SectionType::Experiment => "experiment",
            SectionType::Results => "results",
            SectionType::Discussion => "discussion",
            SectionType::Conclusion => "conclusion",
            SectionType::FutureWork => "future_work",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        SectionType::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Lowercase phrases that mark a heading of this type
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            SectionType::Abstract => &["abstract"],
            SectionType::Introduction => &["introduction", "background"],
            SectionType::LiteratureReview => &[
                "literature review",
                "background study",
                "related work",
                "review on literature",
            ],
            SectionType::Methodology => &["methodology", "methods", "approach"],
            SectionType::Experiment => &["experiments", "implementation", "evaluation"],
            SectionType::Results => &["results", "findings"],
            SectionType::Discussion => &["discussion", "analysis"],
            SectionType::Conclusion => &["conclusion", "summary"],
            SectionType::FutureWork => &["future work", "scope"],
        }
    }

    /// Display title, e.g. `future_work` -> "Future Work"
    pub fn title(&self) -> String {
        format_section_title(self.as_str())
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turn an underscore key into a title: each word capitalized, joined by spaces
pub fn format_section_title(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// True for lines like "2. Methods" or "3.1 Related Work"
pub fn is_numbered_heading(line: &str) -> bool {
    NUMBERED_HEADING.is_match(line)
}

/// Classify a trimmed line using the default heading-length limit
pub fn classify(line: &str) -> Option<SectionType> {
    classify_with_limit(line, MAX_HEADING_CHARS)
}

/// Classify a trimmed line; lines of `max_heading_chars` or more never match
pub fn classify_with_limit(line: &str, max_heading_chars: usize) -> Option<SectionType> {
    if is_numbered_heading(line) {
        return None;
    }

    if line.chars().count() >= max_heading_chars {
        return None;
    }

    let lower = line.to_lowercase();
    SectionType::ALL
        .iter()
        .copied()
        .find(|section_type| section_type.aliases().iter().any(|alias| lower.contains(alias)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_plain_headings() {
        assert_eq!(classify("Abstract"), Some(SectionType::Abstract));
        assert_eq!(classify("INTRODUCTION"), Some(SectionType::Introduction));
        assert_eq!(classify("Related Work"), Some(SectionType::LiteratureReview));
        assert_eq!(classify("Proposed Methodology"), Some(SectionType::Methodology));
        assert_eq!(classify("Experiments"), Some(SectionType::Experiment));
        assert_eq!(classify("Results"), Some(SectionType::Results));
        assert_eq!(classify("Discussion"), Some(SectionType::Discussion));
        assert_eq!(classify("Conclusions"), Some(SectionType::Conclusion));
        assert_eq!(classify("Future Work"), Some(SectionType::FutureWork));
    }

    #[test]
    fn test_classify_every_alias() {
        for section_type in SectionType::ALL {
            for alias in section_type.aliases() {
                let classified = classify(alias).expect("alias should classify");
                // An earlier type may claim the alias first ("background study")
                let position = |t: SectionType| SectionType::ALL.iter().position(|x| *x == t);
                assert!(position(classified) <= position(section_type), "{alias}");
            }
        }
    }

    #[test]
    fn test_table_order_wins() {
        // "background" (introduction) is a substring of "background study"
        assert_eq!(classify("Background Study"), Some(SectionType::Introduction));
        // "results" is checked before "discussion"
        assert_eq!(classify("Results and Discussion"), Some(SectionType::Results));
    }

    #[test]
    fn test_numbered_headings_are_not_classified() {
        assert_eq!(classify("1. Introduction"), None);
        assert_eq!(classify("2 Related Work"), None);
        assert_eq!(classify("3.1 Methods"), None);
        assert_eq!(classify("4.2. Results"), None);
    }

    #[test]
    fn test_numbered_heading_pattern() {
        assert!(is_numbered_heading("2. Background"));
        assert!(is_numbered_heading("3.1 Setup"));
        assert!(is_numbered_heading("10 Appendix"));
        assert!(!is_numbered_heading("2.Background"));
        assert!(!is_numbered_heading("Section 2"));
        assert!(!is_numbered_heading("2024"));
    }

    #[test]
    fn test_long_lines_are_prose() {
        let line = "In this section we discuss the results of the experiments in considerable detail, including ablations.";
        assert!(line.chars().count() >= MAX_HEADING_CHARS);
        assert_eq!(classify(line), None);
        assert_eq!(classify_with_limit(line, 200), Some(SectionType::Experiment));
    }

    #[test]
    fn test_heading_length_boundary() {
        let padded = |len: usize| format!("Results {}", "z".repeat(len - "Results ".len()));

        let under = padded(MAX_HEADING_CHARS - 1);
        assert_eq!(under.chars().count(), 99);
        assert_eq!(classify(&under), Some(SectionType::Results));

        let at_limit = padded(MAX_HEADING_CHARS);
        assert_eq!(at_limit.chars().count(), 100);
        assert_eq!(classify(&at_limit), None);
    }

    #[test]
    fn test_no_alias() {
        assert_eq!(classify("Acknowledgements"), None);
        assert_eq!(classify("References"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_format_section_title() {
        assert_eq!(format_section_title("future_work"), "Future Work");
        assert_eq!(format_section_title("literature_review"), "Literature Review");
        assert_eq!(format_section_title("abstract"), "Abstract");
        assert_eq!(SectionType::Methodology.title(), "Methodology");
    }

    #[test]
    fn test_round_trip_keys() {
        for section_type in SectionType::ALL {
            assert_eq!(SectionType::from_str(section_type.as_str()), Some(section_type));
        }
        assert_eq!(SectionType::from_str("references"), None);
    }
}
