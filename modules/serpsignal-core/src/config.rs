use std::env;
use std::time::Duration;

use crate::error::BriefError;

pub const DEFAULT_AUDIENCE: &str = "SEO manager e content strategist";
pub const DEFAULT_GOAL: &str = "Posizionarsi per questa keyword e generare lead";

/// Pipeline configuration loaded from environment variables.
///
/// Both provider keys are validated here, before any network call is made.
#[derive(Debug, Clone)]
pub struct Config {
    pub serp_api_key: String,
    pub openai_api_key: String,

    /// Domain excluded from ranking results, usually the site the brief
    /// is being written for.
    pub target_domain: Option<String>,

    pub model: String,
    pub max_completion_tokens: u32,

    pub serp_country: String,
    pub serp_language: String,

    /// Per-page fetch budget.
    pub fetch_timeout: Duration,
    /// Pause between consecutive page fetches.
    pub fetch_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, BriefError> {
        Ok(Self {
            serp_api_key: required_env("SERP_API_KEY")?,
            openai_api_key: required_env("OPENAI_API_KEY")?,
            target_domain: optional_env("TARGET_DOMAIN"),
            model: env::var("BRIEF_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            max_completion_tokens: 4096,
            serp_country: env::var("SERP_COUNTRY").unwrap_or_else(|_| "it".to_string()),
            serp_language: env::var("SERP_LANGUAGE").unwrap_or_else(|_| "it".to_string()),
            fetch_timeout: Duration::from_secs(8),
            fetch_delay: Duration::from_secs(1),
        })
    }
}

fn required_env(key: &str) -> Result<String, BriefError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(BriefError::Config(format!(
            "{key} environment variable is required"
        ))),
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
