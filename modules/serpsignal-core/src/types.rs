use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use serp_client::RankedResult;

/// Heading levels tracked in a page outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }

    /// Indentation in the aggregated summary: none, two, six spaces.
    /// Part of the model-conditioning contract.
    pub fn indent(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "",
            HeadingLevel::H2 => "  ",
            HeadingLevel::H3 => "      ",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "h1" => Some(HeadingLevel::H1),
            "h2" => Some(HeadingLevel::H2),
            "h3" => Some(HeadingLevel::H3),
            _ => None,
        }
    }
}

/// One structural marker from a competitor page. Headings keep document
/// order; H1/H2/H3 interleaving encodes structure, not a sorted hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
}

/// Structural features derived from one page fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSignal {
    pub page_title: String,
    pub meta_description: String,
    pub headings: Vec<Heading>,
    pub word_count: usize,
}

impl PageSignal {
    /// Placeholder recorded when a page could not be fetched or parsed.
    /// A valid terminal state, not an error.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A ranking entry merged with its extracted signal; the unit passed to
/// the aggregator and renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorPage {
    pub rank: RankedResult,
    pub signal: PageSignal,
}

/// Everything the synthesizer needs for one brief.
/// Invariant: `pages` ordered by position ascending.
#[derive(Debug, Clone)]
pub struct BriefRequest {
    pub keyword: String,
    pub audience: String,
    pub goal: String,
    pub pages: Vec<CompetitorPage>,
}

/// The terminal artifact of a run.
#[derive(Debug, Clone)]
pub struct BriefDocument {
    /// Verbatim model output. Authoritative.
    pub raw_text: String,
    /// Best-effort structural re-interpretation of `raw_text` as a
    /// standalone styled document.
    pub html: String,
}

/// A completed pipeline run.
#[derive(Debug, Clone)]
pub struct BriefRun {
    pub id: String,
    pub request: BriefRequest,
    pub document: BriefDocument,
    /// Pages whose fetch failed and were recorded as placeholder signals.
    pub degraded_pages: usize,
    pub generated_at: DateTime<Utc>,
}
