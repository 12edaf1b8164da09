/*!
 * Error types for the summasub application.
 *
 * This module contains custom error types for the different stages of a
 * summary run, using the thiserror crate for ergonomic error definitions:
 *
 * - `SubtitleError`: malformed subtitle input (raised before any request)
 * - `ConfigError`: invalid configuration (raised before any request)
 * - `ProviderError`: upstream request failures and malformed responses
 * - `SummaryError`: a failed run, naming the chunk that failed
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// The response body could not be understood
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether the failure is about the shape of the response rather than the transport
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }

    /// Upstream HTTP status, when the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status_code, .. } => Some(*status_code),
            Self::AuthenticationError(_) => Some(401),
            Self::RateLimitExceeded(_) => Some(429),
            _ => None,
        }
    }
}

/// Errors that can occur while parsing subtitle input
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubtitleError {
    /// Input bytes are not valid UTF-8
    #[error("Subtitle input is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    /// A block does not start with a positive integer index
    #[error("Line {line}: invalid subtitle index '{value}'")]
    InvalidIndex {
        /// 1-based line number
        line: usize,
        /// Offending text
        value: String,
    },

    /// The timing line of a block is missing
    #[error("Line {line}: missing timestamp line for subtitle {index}")]
    MissingTimestamp {
        /// 1-based line number
        line: usize,
        /// Index of the block being parsed
        index: usize,
    },

    /// The timing line is present but cannot be parsed
    #[error("Line {line}: invalid timestamp '{value}'")]
    InvalidTimestamp {
        /// 1-based line number
        line: usize,
        /// Offending text
        value: String,
    },

    /// Two blocks run into each other without a blank line
    #[error("Line {line}: missing blank line after subtitle {index}")]
    MissingSeparator {
        /// 1-based line number
        line: usize,
        /// Index of the block that was not terminated
        index: usize,
    },
}

/// Errors caused by invalid configuration
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Chunk threshold must be a positive integer
    #[error("Invalid chunk size: max tokens per chunk must be positive, got {0}")]
    InvalidChunkSize(i64),

    /// A prompt template is missing a required placeholder
    #[error("Prompt template is missing the required placeholder {0}")]
    MissingPlaceholder(String),

    /// The template asks for a number of points but none was configured
    #[error("Prompt template asks for a point count but points_per_chunk is not set")]
    MissingPointCount,

    /// No credential was supplied
    #[error("API key is required")]
    MissingApiKey,

    /// Model name is empty
    #[error("Model name is required")]
    MissingModel,

    /// Temperature outside the range accepted by the API
    #[error("Invalid temperature {0}: must be between 0.0 and 2.0")]
    InvalidTemperature(f32),

    /// Endpoint is not a usable URL
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// Configured endpoint
        endpoint: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Errors that end a summary run
#[derive(Error, Debug)]
pub enum SummaryError {
    /// The subtitle input could not be parsed
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// The run was misconfigured
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A completion request failed
    #[error("Chunk {chunk_index} of {total_chunks} failed: {source}")]
    Chunk {
        /// 1-based index of the failed chunk
        chunk_index: usize,
        /// Number of chunks in the run
        total_chunks: usize,
        /// Underlying provider failure
        #[source]
        source: ProviderError,
    },
}

impl SummaryError {
    /// The 1-based index of the chunk that failed, if a request was involved
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            Self::Chunk { chunk_index, .. } => Some(*chunk_index),
            _ => None,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from a summary run
    #[error("Summary error: {0}")]
    Summary(#[from] SummaryError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
