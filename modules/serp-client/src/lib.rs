pub mod error;
pub mod types;

pub use error::{Result, SerpError};
pub use types::{OrganicResult, RankedResult, SearchResponse};

use std::time::Duration;

use tracing::{info, warn};

const VALUESERP_URL: &str = "https://api.valueserp.com/search";
const SERPAPI_URL: &str = "https://serpapi.com/search";

/// Extra results requested beyond the caller's count, to absorb losses
/// from domain exclusion.
const OVERFETCH: u32 = 5;

/// Max length of the raw-response excerpt carried in NoResults diagnostics.
const EXCERPT_LEN: usize = 300;

pub struct SerpClient {
    client: reqwest::Client,
    api_key: String,
    excluded_domain: Option<String>,
    country: String,
    language: String,
}

impl SerpClient {
    pub fn new(api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.to_string(),
            excluded_domain: None,
            country: "it".to_string(),
            language: "it".to_string(),
        }
    }

    /// Exclude results whose bare domain contains `domain` (case-insensitive).
    /// Typically the site the brief is being written for.
    pub fn with_excluded_domain(mut self, domain: &str) -> Self {
        if !domain.trim().is_empty() {
            self.excluded_domain = Some(domain.trim().to_string());
        }
        self
    }

    pub fn with_locale(mut self, country: &str, language: &str) -> Self {
        self.country = country.to_string();
        self.language = language.to_string();
        self
    }

    /// Fetch up to `count` ranked organic results for `keyword`.
    ///
    /// Queries ValueSERP first; on a non-success response retries once
    /// against SerpAPI with the same query shape. Both providers return
    /// the `{organic_results: [...]}` schema.
    pub async fn search(&self, keyword: &str, count: usize) -> Result<Vec<RankedResult>> {
        let num = (count as u32 + OVERFETCH).to_string();
        let params = [
            ("api_key", self.api_key.as_str()),
            ("q", keyword),
            ("num", num.as_str()),
            ("gl", self.country.as_str()),
            ("hl", self.language.as_str()),
            ("output", "json"),
        ];

        info!(keyword, count, "Fetching SERP results");

        let resp = self.client.get(VALUESERP_URL).query(&params).send().await?;

        let body = if resp.status().is_success() {
            resp.text().await?
        } else {
            warn!(
                status = resp.status().as_u16(),
                "Primary SERP provider failed, retrying via SerpAPI"
            );
            let resp = self
                .client
                .get(SERPAPI_URL)
                .query(&params)
                .query(&[("engine", "google")])
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(SerpError::Api {
                    status: status.as_u16(),
                    message,
                });
            }
            resp.text().await?
        };

        let data: SearchResponse = serde_json::from_str(&body)?;
        if data.organic_results.is_empty() {
            return Err(SerpError::NoResults(truncate(&body, EXCERPT_LEN)));
        }

        let results = select_results(
            data.organic_results,
            count,
            self.excluded_domain.as_deref(),
        );
        if results.is_empty() {
            // Every organic result matched the excluded domain.
            return Err(SerpError::NoResults(truncate(&body, EXCERPT_LEN)));
        }

        info!(keyword, collected = results.len(), "SERP results collected");
        Ok(results)
    }
}

/// Filter raw organic results against the excluded domain and assign
/// positions, stopping once `count` survivors are collected.
///
/// Position comes from the provider's own rank field when present, else
/// the 1-based index among survivors. A provider that omits the field
/// mid-list can therefore yield non-monotonic positions; they are kept
/// as assigned, not re-sorted.
pub fn select_results(
    raw: Vec<OrganicResult>,
    count: usize,
    excluded_domain: Option<&str>,
) -> Vec<RankedResult> {
    let excluded = excluded_domain.map(str::to_lowercase);
    let mut results = Vec::new();

    for item in raw {
        let url = item.url().to_string();
        if let Some(ref excluded) = excluded {
            if bare_domain(&url).contains(excluded.as_str()) {
                continue;
            }
        }

        results.push(RankedResult {
            position: item.position.unwrap_or(results.len() as u32 + 1),
            url,
            title: item.title.clone().unwrap_or_default(),
            snippet: item.snippet().to_string(),
        });

        if results.len() >= count {
            break;
        }
    }

    results
}

/// Bare domain of a URL: scheme and leading `www.` stripped, path
/// discarded, lowercased.
fn bare_domain(url: &str) -> String {
    let rest = url.split("://").nth(1).unwrap_or(url);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    rest.split('/').next().unwrap_or("").to_lowercase()
}

fn truncate(s: &str, max: usize) -> String {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn organic(position: Option<u32>, link: &str, title: &str) -> OrganicResult {
        OrganicResult {
            position,
            link: Some(link.to_string()),
            url: None,
            title: Some(title.to_string()),
            snippet: Some(format!("snippet for {title}")),
            description: None,
        }
    }

    #[test]
    fn bare_domain_strips_scheme_www_and_path() {
        assert_eq!(bare_domain("https://www.example.com/a/b"), "example.com");
        assert_eq!(bare_domain("http://Example.COM/x"), "example.com");
        assert_eq!(bare_domain("https://blog.other.org"), "blog.other.org");
    }

    #[test]
    fn excluded_domain_is_filtered_case_insensitively() {
        let raw = vec![
            organic(Some(1), "https://www.MySite.com/page", "mine"),
            organic(Some(2), "https://other.org/page", "other"),
            organic(Some(3), "https://sub.mysite.com/deep", "mine again"),
        ];

        let results = select_results(raw, 10, Some("mysite.com"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://other.org/page");
    }

    #[test]
    fn collects_exactly_count_in_position_order() {
        let raw: Vec<OrganicResult> = (1..=8)
            .map(|i| organic(Some(i), &format!("https://site{i}.com"), "t"))
            .collect();

        let results = select_results(raw, 3, None);
        assert_eq!(results.len(), 3);
        let positions: Vec<u32> = results.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn position_falls_back_to_survivor_index() {
        let raw = vec![
            organic(None, "https://a.com", "a"),
            organic(None, "https://b.com", "b"),
        ];

        let results = select_results(raw, 5, None);
        assert_eq!(results[0].position, 1);
        assert_eq!(results[1].position, 2);
    }

    #[test]
    fn provider_rank_wins_over_index_when_present() {
        // Mid-list omission: provider rank is kept per item, which can
        // produce a non-monotonic sequence. Kept as assigned, see DESIGN.md.
        let raw = vec![
            organic(Some(4), "https://a.com", "a"),
            organic(None, "https://b.com", "b"),
        ];

        let results = select_results(raw, 5, None);
        assert_eq!(results[0].position, 4);
        assert_eq!(results[1].position, 2);
    }

    #[test]
    fn url_and_snippet_fallback_fields() {
        let item = OrganicResult {
            position: Some(1),
            link: None,
            url: Some("https://alt.example".to_string()),
            title: None,
            snippet: None,
            description: Some("desc".to_string()),
        };
        assert_eq!(item.url(), "https://alt.example");
        assert_eq!(item.snippet(), "desc");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "àèìòù".repeat(100);
        let t = truncate(&s, 301);
        assert!(t.len() <= 301);
        assert!(s.starts_with(&t));
    }
}
