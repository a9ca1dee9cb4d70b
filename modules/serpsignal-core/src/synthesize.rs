//! Brief synthesis: one completion call over the aggregated landscape.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use openai_client::{ChatMessage, ChatRequest, OpenAiClient};

use crate::aggregate;
use crate::error::BriefError;
use crate::schema;
use crate::types::BriefRequest;

/// System persona for the completion call.
const SYSTEM_PROMPT: &str = "Sei un senior SEO content strategist. Analizza i dati SERP \
     forniti e produci un brief dettagliato e operativo sui contenuti.";

/// Seam over the model provider so the pipeline can run against a fake.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Production backend over the OpenAI chat API with a bounded output
/// ceiling.
pub struct OpenAiBackend {
    client: OpenAiClient,
    model: String,
    max_tokens: u32,
}

impl OpenAiBackend {
    pub fn new(api_key: &str, model: &str, max_tokens: u32) -> Self {
        Self {
            client: OpenAiClient::new(api_key),
            model: model.to_string(),
            max_tokens,
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest::new(self.model.as_str())
            .max_tokens(self.max_tokens)
            .message(ChatMessage::system(system))
            .message(ChatMessage::user(user));
        Ok(self.client.chat(&request).await?)
    }
}

pub struct BriefSynthesizer {
    backend: Arc<dyn CompletionBackend>,
}

impl BriefSynthesizer {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Issue exactly one completion request and return the raw brief text
    /// verbatim. Provider failures abort the run; there is no retry.
    pub async fn synthesize(&self, request: &BriefRequest) -> Result<String, BriefError> {
        let prompt = build_user_prompt(request);

        info!(
            keyword = request.keyword.as_str(),
            pages = request.pages.len(),
            "Synthesizing brief"
        );

        self.backend
            .complete(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| BriefError::Synthesis(format!("{e:#}")))
    }
}

/// Build the user instruction: keyword, audience, goal, the aggregated
/// competitive summary, and the section schema the renderer parses back.
pub fn build_user_prompt(request: &BriefRequest) -> String {
    format!(
        "Parola chiave target: {keyword}\n\
         Pubblico di destinazione: {audience}\n\
         Obiettivo del contenuto: {goal}\n\
         \n\
         Ecco le prime {count} pagine in classifica:\n\
         {summary}\n\
         \n\
         Produci un brief con queste sezioni:\n\
         \n\
         {sections}\n\
         \n\
         Formatta ogni sezione con il numero e il titolo in MAIUSCOLO.",
        keyword = request.keyword,
        audience = request.audience,
        goal = request.goal,
        count = request.pages.len(),
        summary = aggregate::summarize(&request.pages),
        sections = schema::section_instructions(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompetitorPage, PageSignal, RankedResult};

    fn request() -> BriefRequest {
        BriefRequest {
            keyword: "content marketing B2B".to_string(),
            audience: "Marketing manager".to_string(),
            goal: "Top 5".to_string(),
            pages: vec![CompetitorPage {
                rank: RankedResult {
                    position: 1,
                    url: "https://example.com".to_string(),
                    title: "Esempio".to_string(),
                    snippet: "Uno snippet".to_string(),
                },
                signal: PageSignal::empty(),
            }],
        }
    }

    #[test]
    fn prompt_carries_inputs_summary_and_section_schema() {
        let prompt = build_user_prompt(&request());

        assert!(prompt.contains("Parola chiave target: content marketing B2B"));
        assert!(prompt.contains("Pubblico di destinazione: Marketing manager"));
        assert!(prompt.contains("Obiettivo del contenuto: Top 5"));
        assert!(prompt.contains("Ecco le prime 1 pagine in classifica:"));
        assert!(prompt.contains("--- Posizione 1 ---"));
        assert!(prompt.contains("1. ANALISI DELL'INTENTO DI RICERCA"));
        assert!(prompt.contains("9. NOTE SUL CONTENUTO"));
        assert!(prompt.contains("MAIUSCOLO"));
    }
}
