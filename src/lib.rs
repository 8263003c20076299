pub mod analysis_client;
pub mod enrichment;
pub mod error;
pub mod papers;
pub mod settings;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use analysis_client::{AnalysisClient, AnalysisResult, Dependency, Entity};
pub use enrichment::{EnrichmentKind, EnrichmentSession};
pub use error::{ClientError, PaperError};
pub use papers::section_classifier::{classify, SectionType};
pub use papers::section_parser::{organize, organize_by_numbers, OrganizerConfig, Strategy};
pub use papers::Section;
