use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreelineError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Score error: {0}")]
    Score(String),

    #[error("Normalization error: {0}")]
    Normalize(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
