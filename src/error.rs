#[derive(Debug, thiserror::Error)]
pub enum TrendsError {
    #[error("Invalid query: {0}")]
    Validation(String),

    #[error("Rate limited by Google Trends: {0}")]
    RateLimited(String),

    #[error("Trends client error: {0}")]
    Client(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid trends data: {0}")]
    InvalidData(String),

    #[error("Chart rendering error: {0}")]
    Chart(String),

    #[error("PDF error: {0}")]
    Document(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrendsError {
    /// `true` when the trends backend refused the request because of request volume.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TrendsError::RateLimited(_))
    }

    /// Message suitable for showing to the person who submitted the query.
    pub fn user_message(&self) -> String {
        match self {
            TrendsError::Validation(msg) => msg.clone(),
            TrendsError::RateLimited(_) => {
                "Google Trends is receiving too many requests right now. \
                 Wait a minute and try again."
                    .to_string()
            }
            TrendsError::Client(msg) => format!("Could not query Google Trends: {msg}"),
            TrendsError::Http(e) => format!("Could not query Google Trends: {e}"),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrendsError>;
