//! SERP competitor-signal extraction and AI content-brief pipeline.
//!
//! Data flows strictly forward: ranking results, per-page signals, the
//! aggregated summary, the model brief, the rendered document. No stage
//! reads back from a later one.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod render;
pub mod schema;
pub mod synthesize;
pub mod types;

pub use config::{Config, DEFAULT_AUDIENCE, DEFAULT_GOAL};
pub use error::BriefError;
pub use pipeline::{
    BriefParams, BriefPipeline, NoopSink, PacingPolicy, ProgressEvent, ProgressSink,
    RankingSource,
};
pub use types::{
    BriefDocument, BriefRequest, BriefRun, CompetitorPage, Heading, HeadingLevel, PageSignal,
    RankedResult,
};
