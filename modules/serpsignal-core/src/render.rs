//! Brief rendering: the raw model text re-interpreted as a styled,
//! self-contained HTML document, plus deterministic artifact naming.

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::schema::{BriefLine, LineClassifier};
use crate::types::{BriefRequest, CompetitorPage, HeadingLevel};

/// Stylesheet for the standalone document. Kept out of the assembly code
/// so the markup builders stay readable.
const DOCUMENT_STYLE: &str = r#":root{--blue:#2563eb;--sky:#0ea5e9;--bg:#f8fafc;--card:#fff;--text:#1e293b;--muted:#64748b;--border:#e2e8f0}
*{box-sizing:border-box;margin:0;padding:0}
body{font-family:'DM Sans',sans-serif;background:var(--bg);color:var(--text);line-height:1.75;padding:2rem 1rem}
.wrap{max-width:860px;margin:0 auto}
.hero{background:linear-gradient(135deg,#0f172a,#1e3a5f 60%,var(--sky));border-radius:14px;padding:2.5rem;margin-bottom:2rem;color:#fff}
.hero h1{font-family:'Syne',sans-serif;font-size:1.9rem;font-weight:800;margin-bottom:.4rem}
.hero .sub{opacity:.7;font-size:.95rem}
.meta{display:grid;grid-template-columns:repeat(auto-fit,minmax(180px,1fr));gap:.75rem;margin-top:1.25rem}
.mi{background:rgba(255,255,255,.12);border-radius:8px;padding:.6rem 1rem}
.mi .l{font-size:.68rem;text-transform:uppercase;letter-spacing:.08em;opacity:.75}
.mi .v{font-weight:600;font-size:.92rem}
.card{background:var(--card);border:1px solid var(--border);border-radius:12px;padding:1.75rem 2rem;margin-bottom:1.5rem;box-shadow:0 1px 4px rgba(0,0,0,.04)}
.card h2{font-family:'Syne',sans-serif;font-size:1rem;color:var(--muted);margin-bottom:1rem;padding-bottom:.5rem;border-bottom:1px solid var(--border)}
h2.sec{font-family:'Syne',sans-serif;font-size:1rem;font-weight:700;color:var(--blue);margin:1.5rem 0 .5rem;display:flex;align-items:center;gap:.5rem}
.n{background:var(--blue);color:#fff;border-radius:50%;width:1.55rem;height:1.55rem;display:inline-flex;align-items:center;justify-content:center;font-size:.78rem;flex-shrink:0}
p{margin-bottom:.7rem}
ul{margin:.3rem 0 .7rem}
li{margin-left:1.4rem;margin-bottom:.3rem}
a{color:var(--blue);text-decoration:none}a:hover{text-decoration:underline}
.ol-h1{font-weight:700;margin:.7rem 0 .2rem}
.ol-h2{font-weight:500;color:var(--muted);margin:.35rem 0 .15rem .9rem}
.ol-h3{font-weight:400;font-style:italic;color:var(--muted);margin:.2rem 0 .2rem 1.8rem}
table{width:100%;border-collapse:collapse;font-size:.88rem}
th{background:var(--bg);padding:.5rem .75rem;text-align:left;font-size:.72rem;text-transform:uppercase;letter-spacing:.06em;color:var(--muted)}
td{padding:.5rem .75rem;border-top:1px solid var(--border);vertical-align:top}
tr:hover td{background:var(--bg)}
footer{text-align:center;margin-top:2rem;font-size:.78rem;color:var(--muted)}"#;

/// Render the complete standalone document: hero header with the request
/// metadata, competitor table, and the parsed brief body.
pub fn render_document(
    request: &BriefRequest,
    raw_text: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let date_label = generated_at.format("%d %B %Y").to_string();

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"it\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\"/>\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\"/>\n");
    html.push_str(&format!(
        "<title>Content Brief — {}</title>\n",
        escape(&request.keyword)
    ));
    html.push_str(
        "<link href=\"https://fonts.googleapis.com/css2?family=Syne:wght@400;700;800&family=DM+Sans:wght@300;400;500&display=swap\" rel=\"stylesheet\"/>\n",
    );
    html.push_str("<style>\n");
    html.push_str(DOCUMENT_STYLE);
    html.push_str("\n</style>\n</head>\n<body>\n<div class=\"wrap\">\n");

    html.push_str(&render_hero(request, &date_label));
    html.push_str(&render_competitor_table(&request.pages));

    html.push_str("<div class=\"card\">\n<h2>Brief generato da AI</h2>\n");
    html.push_str(&render_body(raw_text));
    html.push_str("</div>\n");

    html.push_str(&format!(
        "<footer>Content Brief Generator · {date_label}</footer>\n"
    ));
    html.push_str("</div></body></html>\n");
    html
}

fn render_hero(request: &BriefRequest, date_label: &str) -> String {
    let mut hero = String::new();
    hero.push_str("<div class=\"hero\">\n<h1>Content Brief</h1>\n");
    hero.push_str(&format!(
        "<div class=\"sub\">Generato il {date_label}</div>\n"
    ));
    hero.push_str("<div class=\"meta\">\n");
    for (label, value) in [
        ("Keyword", request.keyword.as_str()),
        ("Pubblico", request.audience.as_str()),
        ("Obiettivo", request.goal.as_str()),
    ] {
        hero.push_str(&format!(
            "<div class=\"mi\"><div class=\"l\">{label}</div><div class=\"v\">{}</div></div>\n",
            escape(value)
        ));
    }
    hero.push_str(&format!(
        "<div class=\"mi\"><div class=\"l\">Pagine analizzate</div><div class=\"v\">{}</div></div>\n",
        request.pages.len()
    ));
    hero.push_str("</div>\n</div>\n");
    hero
}

fn render_competitor_table(pages: &[CompetitorPage]) -> String {
    let mut table = String::new();
    table.push_str("<div class=\"card\">\n<h2>Competitor analizzati</h2>\n");
    table.push_str(
        "<table><thead><tr><th>#</th><th>Pagina</th><th>Parole stimate</th></tr></thead>\n<tbody>\n",
    );
    for page in pages {
        let label = if page.rank.title.is_empty() {
            truncate_chars(&page.rank.url, 50)
        } else {
            page.rank.title.clone()
        };
        table.push_str(&format!(
            "<tr><td>{}</td><td><a href=\"{}\" target=\"_blank\">{}</a></td><td>~{}</td></tr>\n",
            page.rank.position,
            escape(&page.rank.url),
            escape(&label),
            page.signal.word_count
        ));
    }
    table.push_str("</tbody></table>\n</div>\n");
    table
}

/// Parse the raw brief into body markup, line by line. Total: every line
/// renders as something; at worst an unrecognized shape flattens into a
/// plain paragraph.
fn render_body(raw_text: &str) -> String {
    let classifier = LineClassifier::new();
    let mut html = String::new();
    let mut in_list = false;

    for line in raw_text.lines() {
        let Some(classified) = classifier.classify(line) else {
            continue;
        };

        if in_list && !matches!(classified, BriefLine::Bullet(_)) {
            html.push_str("</ul>\n");
            in_list = false;
        }

        match classified {
            BriefLine::Section { number, title } => {
                html.push_str(&format!(
                    "<h2 class=\"sec\"><span class=\"n\">{}</span>{}</h2>\n",
                    escape(&number),
                    escape(&title_case(&title))
                ));
            }
            BriefLine::Bullet(text) => {
                if !in_list {
                    html.push_str("<ul>\n");
                    in_list = true;
                }
                html.push_str(&format!("<li>{}</li>\n", escape(&text)));
            }
            BriefLine::Outline { level, text } => {
                let (tag, class) = match level {
                    HeadingLevel::H1 => ("h3", "ol-h1"),
                    HeadingLevel::H2 => ("h4", "ol-h2"),
                    HeadingLevel::H3 => ("h5", "ol-h3"),
                };
                html.push_str(&format!(
                    "<{tag} class=\"{class}\">{}</{tag}>\n",
                    escape(&text)
                ));
            }
            BriefLine::Paragraph(text) => {
                html.push_str(&format!("<p>{}</p>\n", escape(&text)));
            }
        }
    }

    if in_list {
        html.push_str("</ul>\n");
    }
    html
}

/// Deterministic artifact base name: slugified keyword plus the run date.
pub fn artifact_basename(keyword: &str, generated_at: DateTime<Utc>) -> String {
    format!(
        "brief_{}_{}",
        slugify(keyword),
        generated_at.format("%Y-%m-%d")
    )
}

/// Lowercase, whitespace/underscore runs collapsed to single hyphens,
/// remaining non-word/non-hyphen characters removed.
pub fn slugify(keyword: &str) -> String {
    let lower = keyword.to_lowercase();
    let collapsed = Regex::new(r"[\s_]+")
        .expect("valid regex")
        .replace_all(&lower, "-");
    Regex::new(r"[^\w-]")
        .expect("valid regex")
        .replace_all(&collapsed, "")
        .into_owned()
}

/// Lowercase each word, then capitalize its first letter. Display form
/// for section titles the model emits in all caps.
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
