use thiserror::Error;

/// Application-wide error types for mandi.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// HTTP request completed with a status outside 2xx/3xx, or the body could not be read.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The fetched page is an anti-bot challenge rather than content.
    #[error("Bot protection detected: {0}")]
    BotDetected(String),

    /// A page or API response could not be turned into usable records.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Caller supplied an unusable argument (empty search term, bad flag).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Details lookup for a URL whose host is not a known marketplace.
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// Nothing could be extracted and no fallback is allowed.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error (missing or malformed environment value).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if the fallback ladder recovers from this error locally
    /// by advancing to its next stage.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_)
                | AppError::NetworkError(_)
                | AppError::Timeout(_)
                | AppError::BotDetected(_)
                | AppError::ParseError(_)
                | AppError::NotFound(_)
        )
    }
}
