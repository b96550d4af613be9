use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Listing container not found: {0}")]
    ContainerNotFound(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Unparseable date: {0:?}")]
    UnparseableDate(String),

    #[error("Invalid threshold date {0:?}, expected YYYY-MM-DD")]
    InvalidThreshold(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sink error: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, Error>;
