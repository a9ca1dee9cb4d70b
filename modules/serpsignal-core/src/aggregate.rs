//! Signal aggregation: the single ordered textual summary of the
//! competitive landscape that the model is conditioned on.

use crate::types::CompetitorPage;

/// Fold per-page signals plus ranking metadata into one summary string,
/// one block per page, in page order.
///
/// The exact layout (field order, labels, heading indentation) is a
/// contract with the prompt, not cosmetics. Changing it changes model
/// output.
pub fn summarize(pages: &[CompetitorPage]) -> String {
    let mut lines = Vec::new();
    for page in pages {
        lines.push(format!("\n--- Posizione {} ---", page.rank.position));
        lines.push(format!("URL: {}", page.rank.url));
        lines.push(format!("Titolo SERP: {}", page.rank.title));
        lines.push(format!("Snippet: {}", page.rank.snippet));
        lines.push(format!("Title tag: {}", page.signal.page_title));
        lines.push(format!("Parole stimate: ~{}", page.signal.word_count));
        lines.push("Heading:".to_string());
        for heading in &page.signal.headings {
            lines.push(format!(
                "{}{}: {}",
                heading.level.indent(),
                heading.level.tag(),
                heading.text
            ));
        }
    }
    lines.join("\n")
}
