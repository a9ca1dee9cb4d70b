use serde::{Deserialize, Serialize};

/// Response body shared by both ranking providers. ValueSERP and SerpAPI
/// return the same `organic_results` shape, which is why one parse path
/// covers the fallback too.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
}

/// A single raw organic result. Field names differ slightly between
/// providers: ValueSERP uses `link`/`snippet`, SerpAPI may use
/// `url`/`description`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganicResult {
    pub position: Option<u32>,
    pub link: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub description: Option<String>,
}

impl OrganicResult {
    /// Returns whichever URL field is populated, preferring `link`.
    pub fn url(&self) -> &str {
        self.link
            .as_deref()
            .or(self.url.as_deref())
            .unwrap_or_default()
    }

    /// Returns whichever snippet field is populated, preferring `snippet`.
    pub fn snippet(&self) -> &str {
        self.snippet
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or_default()
    }
}

/// A normalized ranking entry after exclusion filtering and position
/// assignment. Immutable once produced; ordered by `position` ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    /// 1-based rank. Taken from the provider when present, otherwise the
    /// 1-based index among surviving results.
    pub position: u32,
    pub url: String,
    pub title: String,
    pub snippet: String,
}
