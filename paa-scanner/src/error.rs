use thiserror::Error;

/// Failure to obtain or read a search results page.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search endpoint answered with HTTP {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source unavailable for '{question}': {source}")]
    SourceUnavailable {
        question: String,
        #[source]
        source: SourceError,
    },

    #[error("Malformed featured snippet for '{question}': {reason}")]
    AnswerExtraction { question: String, reason: String },

    #[error("Exploration cancelled")]
    Cancelled,
}

impl ScanError {
    pub fn source_unavailable(question: &str, source: SourceError) -> Self {
        ScanError::SourceUnavailable {
            question: question.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
