use thiserror::Error;

#[derive(Error, Debug)]
pub enum BriefError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No ranking results. Response: {0}")]
    NoResults(String),

    #[error("Ranking provider error: {0}")]
    Ranking(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
