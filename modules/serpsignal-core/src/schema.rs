//! The shared definition of the prompt ↔ renderer protocol.
//!
//! The synthesizer instructs the model to emit nine numbered sections with
//! upper-case titles, plus `H1:`/`H2:`/`H3:` outline lines inside the
//! heading-structure section; the renderer parses exactly that shape back
//! into a document. Both sides read from this module so the two halves of
//! the contract cannot drift apart.

use regex::Regex;

use crate::types::HeadingLevel;

/// One section of the brief as the model is instructed to emit it.
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub number: u8,
    pub title: &'static str,
    pub guidance: &'static str,
}

pub const SECTIONS: [SectionSpec; 9] = [
    SectionSpec {
        number: 1,
        title: "ANALISI DELL'INTENTO DI RICERCA",
        guidance: "cosa sta cercando l'utente? (~100 parole)",
    },
    SectionSpec {
        number: 2,
        title: "FORMATO DEL CONTENUTO CONSIGLIATO",
        guidance: "con motivazione.",
    },
    SectionSpec {
        number: 3,
        title: "TAG TITOLO SUGGERITI",
        guidance: "3 opzioni sotto i 60 caratteri.",
    },
    SectionSpec {
        number: 4,
        title: "META DESCRIZIONI SUGGERITE",
        guidance: "2 opzioni sotto i 155 caratteri.",
    },
    SectionSpec {
        number: 5,
        title: "STRUTTURA HEADING CONSIGLIATA",
        guidance: "schema H1/H2/H3 completo, una riga per heading nel formato \
                   \"H2: titolo\". Indica argomenti must-cover, segnali forti \
                   (3+ pagine) e opportunità di differenziazione.",
    },
    SectionSpec {
        number: 6,
        title: "WORD COUNT CONSIGLIATO",
        guidance: "con motivazione.",
    },
    SectionSpec {
        number: 7,
        title: "ENTITÀ CHIAVE DA INCLUDERE",
        guidance: "concetti, strumenti, brand.",
    },
    SectionSpec {
        number: 8,
        title: "OPPORTUNITÀ DI LINK INTERNI",
        guidance: "[Da compilare a cura del team SEO]",
    },
    SectionSpec {
        number: 9,
        title: "NOTE SUL CONTENUTO",
        guidance: "tono, profondità, angolazione.",
    },
];

/// The numbered section list as it appears in the user prompt.
pub fn section_instructions() -> String {
    SECTIONS
        .iter()
        .map(|s| format!("{}. {}: {}", s.number, s.title, s.guidance))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A classified line of raw model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BriefLine {
    /// `3. TAG TITOLO SUGGERITI`: numbered section header.
    Section { number: String, title: String },
    /// `- opzione A`: bullet item, marker stripped.
    Bullet(String),
    /// `H2: Guida completa`: heading-outline line.
    Outline { level: HeadingLevel, text: String },
    /// Anything else, content unchanged.
    Paragraph(String),
}

/// Line-by-line classifier over raw brief text. Rules are tried in
/// priority order and classification is total: a line matching nothing
/// degrades to `Paragraph`, never to an error, so unexpected model
/// phrasing can flatten the layout but can never break rendering.
pub struct LineClassifier {
    section_re: Regex,
    outline_re: Regex,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self {
            // Digits, dot, then an all-uppercase title (letters, spaces,
            // hyphens/dashes). Titles with other punctuation fall through
            // to Paragraph.
            section_re: Regex::new(r"^(\d+)\.\s+(\p{Lu}[\p{Lu}\s\-–—]*)$").expect("valid regex"),
            outline_re: Regex::new(r"^(H1|H2|H3):\s*(.+)$").expect("valid regex"),
        }
    }

    /// Classify one raw line. `None` for blank lines, which are dropped.
    pub fn classify(&self, line: &str) -> Option<BriefLine> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(caps) = self.section_re.captures(line) {
            return Some(BriefLine::Section {
                number: caps[1].to_string(),
                title: caps[2].trim().to_string(),
            });
        }

        if let Some(rest) = strip_bullet(line) {
            return Some(BriefLine::Bullet(rest.to_string()));
        }

        if let Some(caps) = self.outline_re.captures(line) {
            let level = HeadingLevel::from_tag(&caps[1]).expect("regex matched a level tag");
            return Some(BriefLine::Outline {
                level,
                text: caps[2].trim().to_string(),
            });
        }

        Some(BriefLine::Paragraph(line.to_string()))
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_bullet(line: &str) -> Option<&str> {
    if line.starts_with(['-', '•', '*']) {
        Some(line.trim_start_matches(['-', '•', '*', ' ']).trim())
    } else {
        None
    }
}
