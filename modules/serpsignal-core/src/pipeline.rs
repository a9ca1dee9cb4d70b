//! Orchestration: ranking, per-page analysis, synthesis, rendering.
//!
//! One logical thread of execution per run. Page fetches are strictly
//! sequential with a fixed pause between them; a parallel implementation
//! must keep a per-host pacing policy and write results by position
//! index, not arrival order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use serp_client::{RankedResult, SerpClient, SerpError};

use crate::error::BriefError;
use crate::extract::PageAnalyzer;
use crate::fetch::{HttpPageFetcher, PageFetcher};
use crate::render;
use crate::synthesize::{BriefSynthesizer, CompletionBackend, OpenAiBackend};
use crate::types::{BriefDocument, BriefRequest, BriefRun, CompetitorPage, PageSignal};
use crate::Config;

/// Seam over the ranking provider.
#[async_trait]
pub trait RankingSource: Send + Sync {
    async fn search(&self, keyword: &str, count: usize)
        -> serp_client::Result<Vec<RankedResult>>;
}

#[async_trait]
impl RankingSource for SerpClient {
    async fn search(
        &self,
        keyword: &str,
        count: usize,
    ) -> serp_client::Result<Vec<RankedResult>> {
        SerpClient::search(self, keyword, count).await
    }
}

/// Incremental status events surfaced to the invoking layer.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    RankingStarted,
    RankingComplete { count: usize },
    PageFetchStarted { position: u32, url: String },
    PageAnalyzed {
        position: u32,
        headings: usize,
        word_count: usize,
        degraded: bool,
    },
    SynthesisStarted,
    SynthesisComplete,
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

/// Sink that discards all events.
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn on_event(&self, _event: &ProgressEvent) {}
}

/// Inter-call pacing, exposed as configuration rather than hard-coded
/// control flow so the policy stays testable and replaceable.
#[derive(Debug, Clone, Copy)]
pub struct PacingPolicy {
    /// Fixed pause between consecutive page fetches, independent of
    /// fetch outcome. Lowers the chance of being rate-limited or blocked
    /// by target sites.
    pub fetch_delay: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            fetch_delay: Duration::from_secs(1),
        }
    }
}

/// Inputs provided by the invoking layer for one run.
#[derive(Debug, Clone)]
pub struct BriefParams {
    pub keyword: String,
    pub audience: String,
    pub goal: String,
    pub num_results: usize,
}

pub struct BriefPipeline {
    ranking: Arc<dyn RankingSource>,
    analyzer: PageAnalyzer,
    synthesizer: BriefSynthesizer,
    pacing: PacingPolicy,
}

impl BriefPipeline {
    pub fn new(
        ranking: Arc<dyn RankingSource>,
        fetcher: Arc<dyn PageFetcher>,
        backend: Arc<dyn CompletionBackend>,
        pacing: PacingPolicy,
    ) -> Self {
        Self {
            ranking,
            analyzer: PageAnalyzer::new(fetcher),
            synthesizer: BriefSynthesizer::new(backend),
            pacing,
        }
    }

    /// Wire the production clients from configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut serp = SerpClient::new(&config.serp_api_key)
            .with_locale(&config.serp_country, &config.serp_language);
        if let Some(domain) = &config.target_domain {
            serp = serp.with_excluded_domain(domain);
        }

        Self::new(
            Arc::new(serp),
            Arc::new(HttpPageFetcher::new(config.fetch_timeout)),
            Arc::new(OpenAiBackend::new(
                &config.openai_api_key,
                &config.model,
                config.max_completion_tokens,
            )),
            PacingPolicy {
                fetch_delay: config.fetch_delay,
            },
        )
    }

    /// Drive all phases for one run.
    ///
    /// Ranking and synthesis failures abort the run; per-page failures
    /// degrade to placeholder signals and never escalate.
    pub async fn run(
        &self,
        params: &BriefParams,
        sink: &dyn ProgressSink,
    ) -> Result<BriefRun, BriefError> {
        if params.keyword.trim().is_empty() {
            return Err(BriefError::Config("keyword must not be empty".to_string()));
        }

        let run_id = Uuid::new_v4().to_string();
        info!(
            run_id = run_id.as_str(),
            keyword = params.keyword.as_str(),
            num_results = params.num_results,
            "Brief run starting"
        );

        // Phase 1: ranking
        sink.on_event(&ProgressEvent::RankingStarted);
        let results = self
            .ranking
            .search(&params.keyword, params.num_results)
            .await
            .map_err(|e| match e {
                SerpError::NoResults(excerpt) => BriefError::NoResults(excerpt),
                other => BriefError::Ranking(other.to_string()),
            })?;
        sink.on_event(&ProgressEvent::RankingComplete {
            count: results.len(),
        });

        // Phase 2: per-page analysis, sequential and paced
        let total = results.len();
        let mut pages = Vec::with_capacity(total);
        let mut degraded_pages = 0;

        for (index, rank) in results.into_iter().enumerate() {
            sink.on_event(&ProgressEvent::PageFetchStarted {
                position: rank.position,
                url: rank.url.clone(),
            });

            let (signal, degraded) = match self.analyzer.analyze(&rank.url).await {
                Some(signal) => (signal, false),
                None => (PageSignal::empty(), true),
            };
            if degraded {
                degraded_pages += 1;
            }

            sink.on_event(&ProgressEvent::PageAnalyzed {
                position: rank.position,
                headings: signal.headings.len(),
                word_count: signal.word_count,
                degraded,
            });
            pages.push(CompetitorPage { rank, signal });

            if index + 1 < total {
                tokio::time::sleep(self.pacing.fetch_delay).await;
            }
        }

        let request = BriefRequest {
            keyword: params.keyword.clone(),
            audience: params.audience.clone(),
            goal: params.goal.clone(),
            pages,
        };

        // Phase 3: synthesis
        sink.on_event(&ProgressEvent::SynthesisStarted);
        let raw_text = self.synthesizer.synthesize(&request).await?;
        sink.on_event(&ProgressEvent::SynthesisComplete);

        // Phase 4: render
        let generated_at = Utc::now();
        let html = render::render_document(&request, &raw_text, generated_at);

        info!(
            run_id = run_id.as_str(),
            pages = request.pages.len(),
            degraded_pages,
            "Brief run complete"
        );

        Ok(BriefRun {
            id: run_id,
            request,
            document: BriefDocument { raw_text, html },
            degraded_pages,
            generated_at,
        })
    }
}
