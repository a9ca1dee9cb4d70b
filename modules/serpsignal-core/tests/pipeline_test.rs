//! End-to-end pipeline runs against in-memory fakes at every network seam.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use serp_client::{RankedResult, SerpError};
use serpsignal_core::fetch::PageFetcher;
use serpsignal_core::synthesize::CompletionBackend;
use serpsignal_core::{
    BriefError, BriefParams, BriefPipeline, NoopSink, PacingPolicy, ProgressEvent, ProgressSink,
    RankingSource,
};

struct FixedRanking(Vec<RankedResult>);

#[async_trait]
impl RankingSource for FixedRanking {
    async fn search(
        &self,
        _keyword: &str,
        count: usize,
    ) -> serp_client::Result<Vec<RankedResult>> {
        Ok(self.0.iter().take(count).cloned().collect())
    }
}

struct EmptyRanking;

#[async_trait]
impl RankingSource for EmptyRanking {
    async fn search(
        &self,
        _keyword: &str,
        _count: usize,
    ) -> serp_client::Result<Vec<RankedResult>> {
        Err(SerpError::NoResults("{\"organic_results\": []}".to_string()))
    }
}

/// Every fetch fails, as when all competitor sites block the bot.
struct BlockedFetcher;

#[async_trait]
impl PageFetcher for BlockedFetcher {
    async fn fetch(&self, _url: &str) -> anyhow::Result<String> {
        Err(anyhow!("Non-success status 403 Forbidden"))
    }
}

struct StaticFetcher(&'static str);

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> anyhow::Result<String> {
        Ok(self.0.to_string())
    }
}

/// Returns a canned brief and records the prompts it was given.
struct RecordingBackend {
    brief: &'static str,
    prompts: Mutex<Vec<(String, String)>>,
}

impl RecordingBackend {
    fn new(brief: &'static str) -> Self {
        Self {
            brief,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionBackend for RecordingBackend {
    async fn complete(&self, system: &str, user: &str) -> anyhow::Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        Ok(self.brief.to_string())
    }
}

struct FailingBackend;

#[async_trait]
impl CompletionBackend for FailingBackend {
    async fn complete(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
        Err(anyhow!("API error (status 429): rate limited"))
    }
}

#[derive(Default)]
struct RecordingSink(Mutex<Vec<ProgressEvent>>);

impl ProgressSink for RecordingSink {
    fn on_event(&self, event: &ProgressEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

fn ranked(position: u32) -> RankedResult {
    RankedResult {
        position,
        url: format!("https://competitor{position}.com/guida"),
        title: format!("Guida {position}"),
        snippet: format!("Snippet {position}"),
    }
}

fn params(keyword: &str) -> BriefParams {
    BriefParams {
        keyword: keyword.to_string(),
        audience: "SEO manager e content strategist".to_string(),
        goal: "Posizionarsi per questa keyword e generare lead".to_string(),
        num_results: 3,
    }
}

fn no_pacing() -> PacingPolicy {
    PacingPolicy {
        fetch_delay: Duration::ZERO,
    }
}

const CANNED_BRIEF: &str = "1. ANALISI\nIntento informazionale.\n\n3. TAG TITOLO SUGGERITI\n- opzione A\n\nH2: Guida completa";

#[tokio::test]
async fn all_fetches_failing_still_reaches_synthesis_with_placeholders() {
    let backend = Arc::new(RecordingBackend::new(CANNED_BRIEF));
    let pipeline = BriefPipeline::new(
        Arc::new(FixedRanking(vec![ranked(1), ranked(2), ranked(3)])),
        Arc::new(BlockedFetcher),
        backend.clone(),
        no_pacing(),
    );

    let sink = RecordingSink::default();
    let run = pipeline
        .run(&params("content marketing B2B"), &sink)
        .await
        .expect("run should survive blocked fetches");

    assert_eq!(run.request.pages.len(), 3);
    assert_eq!(run.degraded_pages, 3);
    assert!(run
        .request
        .pages
        .iter()
        .all(|p| p.signal.word_count == 0 && p.signal.headings.is_empty()));

    // The model still saw all three pages, each with a zero word count.
    let prompts = backend.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    let user_prompt = &prompts[0].1;
    assert_eq!(user_prompt.matches("Parole stimate: ~0").count(), 3);
    assert!(user_prompt.contains("--- Posizione 1 ---"));
    assert!(user_prompt.contains("--- Posizione 3 ---"));

    // Raw text passes through verbatim; the document is rendered from it.
    assert_eq!(run.document.raw_text, CANNED_BRIEF);
    assert!(run.document.html.contains("Tag Titolo Suggeriti"));
    assert!(run.document.html.contains("<li>opzione A</li>"));
}

#[tokio::test]
async fn pages_keep_position_order_and_extracted_signals() {
    let html = "<html><head><title>Pagina</title></head>\
                <body><h1>Titolo</h1><p>uno due tre</p></body></html>";
    let backend = Arc::new(RecordingBackend::new(CANNED_BRIEF));
    let pipeline = BriefPipeline::new(
        Arc::new(FixedRanking(vec![ranked(1), ranked(2)])),
        Arc::new(StaticFetcher(html)),
        backend,
        no_pacing(),
    );

    let run = pipeline
        .run(&params("keyword"), &NoopSink)
        .await
        .unwrap();

    assert_eq!(run.degraded_pages, 0);
    let positions: Vec<u32> = run.request.pages.iter().map(|p| p.rank.position).collect();
    assert_eq!(positions, vec![1, 2]);
    assert!(run
        .request
        .pages
        .iter()
        .all(|p| p.signal.page_title == "Pagina" && p.signal.word_count == 3));
}

#[tokio::test]
async fn progress_events_follow_phase_order() {
    let pipeline = BriefPipeline::new(
        Arc::new(FixedRanking(vec![ranked(1), ranked(2)])),
        Arc::new(BlockedFetcher),
        Arc::new(RecordingBackend::new(CANNED_BRIEF)),
        no_pacing(),
    );

    let sink = RecordingSink::default();
    pipeline.run(&params("keyword"), &sink).await.unwrap();

    let events = sink.0.lock().unwrap();
    let labels: Vec<&str> = events
        .iter()
        .map(|e| match e {
            ProgressEvent::RankingStarted => "ranking_started",
            ProgressEvent::RankingComplete { .. } => "ranking_complete",
            ProgressEvent::PageFetchStarted { .. } => "fetch",
            ProgressEvent::PageAnalyzed { .. } => "analyzed",
            ProgressEvent::SynthesisStarted => "synthesis_started",
            ProgressEvent::SynthesisComplete => "synthesis_complete",
        })
        .collect();
    assert_eq!(
        labels,
        vec![
            "ranking_started",
            "ranking_complete",
            "fetch",
            "analyzed",
            "fetch",
            "analyzed",
            "synthesis_started",
            "synthesis_complete",
        ]
    );
}

#[tokio::test]
async fn empty_keyword_fails_before_any_phase() {
    let pipeline = BriefPipeline::new(
        Arc::new(EmptyRanking),
        Arc::new(BlockedFetcher),
        Arc::new(RecordingBackend::new(CANNED_BRIEF)),
        no_pacing(),
    );

    let sink = RecordingSink::default();
    let err = pipeline.run(&params("   "), &sink).await.unwrap_err();
    assert!(matches!(err, BriefError::Config(_)));
    assert!(sink.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn zero_ranking_results_abort_with_no_results() {
    let pipeline = BriefPipeline::new(
        Arc::new(EmptyRanking),
        Arc::new(BlockedFetcher),
        Arc::new(RecordingBackend::new(CANNED_BRIEF)),
        no_pacing(),
    );

    let err = pipeline
        .run(&params("keyword"), &NoopSink)
        .await
        .unwrap_err();
    assert!(matches!(err, BriefError::NoResults(_)));
}

#[tokio::test]
async fn synthesis_failure_aborts_without_partial_brief() {
    let pipeline = BriefPipeline::new(
        Arc::new(FixedRanking(vec![ranked(1)])),
        Arc::new(BlockedFetcher),
        Arc::new(FailingBackend),
        no_pacing(),
    );

    let err = pipeline
        .run(&params("keyword"), &NoopSink)
        .await
        .unwrap_err();
    match err {
        BriefError::Synthesis(message) => assert!(message.contains("429")),
        other => panic!("expected Synthesis error, got {other:?}"),
    }
}
