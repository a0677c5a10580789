use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkwatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Search provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
