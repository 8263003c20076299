//! On-demand enrichment of organized sections
//!
//! Holds a document's sections, forwards section text to the analysis service
//! and stores the results. At most one request per (section, kind) may be in
//! flight; requests for different sections run concurrently.

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, RwLock};

use crate::analysis_client::{AnalysisClient, AnalysisResult};
use crate::error::{PaperError, Result};
use crate::papers::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentKind {
    Summary,
    Analysis,
}

impl EnrichmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentKind::Summary => "summary",
            EnrichmentKind::Analysis => "analysis",
        }
    }
}

impl fmt::Display for EnrichmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type InFlight = Mutex<HashSet<(u32, EnrichmentKind)>>;

/// Releases an in-flight slot when the request finishes, fails or is dropped
struct InFlightGuard<'a> {
    in_flight: &'a InFlight,
    key: (u32, EnrichmentKind),
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.key);
    }
}

/// Sections of one document plus the client used to enrich them
pub struct EnrichmentSession {
    client: AnalysisClient,
    sections: RwLock<Vec<Section>>,
    in_flight: InFlight,
}

impl EnrichmentSession {
    pub fn new(client: AnalysisClient, sections: Vec<Section>) -> Self {
        Self {
            client,
            sections: RwLock::new(sections),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Snapshot of all sections in document order
    pub fn sections(&self) -> Vec<Section> {
        self.sections.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn section(&self, id: u32) -> Option<Section> {
        self.sections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub fn section_ids(&self) -> Vec<u32> {
        self.sections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|s| s.id)
            .collect()
    }

    pub fn is_in_flight(&self, id: u32, kind: EnrichmentKind) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&(id, kind))
    }

    /// Claim the (section, kind) slot and return the section text to send
    fn begin(&self, id: u32, kind: EnrichmentKind) -> Result<(InFlightGuard<'_>, String)> {
        let content = self
            .section(id)
            .map(|s| s.content)
            .ok_or(PaperError::UnknownSection(id))?;

        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert((id, kind)) {
            return Err(PaperError::RequestInFlight { section_id: id, kind });
        }
        drop(set);

        let guard = InFlightGuard {
            in_flight: &self.in_flight,
            key: (id, kind),
        };
        Ok((guard, content))
    }

    fn apply(&self, id: u32, change: impl FnOnce(&mut Section)) -> Result<()> {
        let mut sections = self.sections.write().unwrap_or_else(|e| e.into_inner());
        let section = sections
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(PaperError::UnknownSection(id))?;
        change(section);
        Ok(())
    }

    /// Request a summary and store it on the section, replacing any earlier one
    pub async fn summarize(&self, id: u32) -> Result<String> {
        let (_guard, content) = self.begin(id, EnrichmentKind::Summary)?;

        let summary = self.client.generate_summary(&content).await?;
        self.apply(id, |section| section.apply_summary(summary.clone()))?;

        info!("[Enrichment] summary stored for section {}", id);
        Ok(summary)
    }

    /// Request entity/dependency analysis and store it on the section
    pub async fn analyze(&self, id: u32) -> Result<AnalysisResult> {
        let (_guard, content) = self.begin(id, EnrichmentKind::Analysis)?;

        let analysis = self.client.analyze_text(&content).await?;
        self.apply(id, |section| section.apply_analysis(analysis.clone()))?;

        info!(
            "[Enrichment] analysis stored for section {} ({} entities, {} dependencies)",
            id,
            analysis.entities.len(),
            analysis.dependencies.len()
        );
        Ok(analysis)
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.sections.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}
