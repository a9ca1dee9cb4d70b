//! Per-page signal extraction: title, meta description, heading outline,
//! approximate prose word count.

use std::sync::Arc;

use scraper::{Html, Selector};
use tracing::info;

use crate::fetch::PageFetcher;
use crate::types::{Heading, HeadingLevel, PageSignal};

pub struct PageAnalyzer {
    fetcher: Arc<dyn PageFetcher>,
}

impl PageAnalyzer {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch one competitor URL and derive its structural signal.
    ///
    /// Never fails: any fetch error returns `None` and the caller records
    /// the placeholder signal. Logged at info level because blocked
    /// fetches are an expected outcome, not an anomaly.
    pub async fn analyze(&self, url: &str) -> Option<PageSignal> {
        match self.fetcher.fetch(url).await {
            Ok(html) => {
                let signal = signal_from_html(&html);
                info!(
                    url,
                    headings = signal.headings.len(),
                    words = signal.word_count,
                    "Analyzed competitor page"
                );
                Some(signal)
            }
            Err(e) => {
                info!(url, error = %e, "Page unavailable, recording empty signal");
                None
            }
        }
    }
}

/// Derive the structural signal from an HTML document. Pure.
pub fn signal_from_html(html: &str) -> PageSignal {
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("title").unwrap();
    let page_title = document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let meta_selector = Selector::parse("meta").unwrap();
    let meta_description = document
        .select(&meta_selector)
        .find(|el| {
            el.value()
                .attr("name")
                .is_some_and(|name| name.to_lowercase().contains("description"))
        })
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    let heading_selector = Selector::parse("h1, h2, h3").unwrap();
    let mut headings = Vec::new();
    for el in document.select(&heading_selector) {
        let Some(level) = HeadingLevel::from_tag(el.value().name()) else {
            continue;
        };
        let text = collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "));
        if text.is_empty() {
            continue;
        }
        headings.push(Heading { level, text });
    }

    // Whitespace-delimited tokens over every paragraph and list item: an
    // approximation of prose volume, not a linguistic word count.
    let prose_selector = Selector::parse("p, li").unwrap();
    let word_count = document
        .select(&prose_selector)
        .map(|el| el.text().collect::<String>().split_whitespace().count())
        .sum();

    PageSignal {
        page_title,
        meta_description,
        headings,
        word_count,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
