/*!
 * Completion providers for summary requests.
 *
 * This module contains the client used to reach the completion endpoint:
 * - OpenAI: OpenAI-compatible chat completions API
 * - Mock: scripted provider for tests and dry runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Text and token usage returned by one completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The generated text
    pub text: String,
    /// Total tokens billed for the request (prompt + completion)
    pub total_tokens: u64,
}

impl Completion {
    pub fn new(text: impl Into<String>, total_tokens: u64) -> Self {
        Self {
            text: text.into(),
            total_tokens,
        }
    }
}

/// Common trait for completion providers
///
/// Implementations issue exactly one request per call and never retry;
/// failures are returned to the caller as-is.
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Complete a system + user prompt pair
    ///
    /// # Arguments
    /// * `system_prompt` - Instructions for the model's role
    /// * `user_prompt` - The rendered chunk prompt
    /// * `temperature` - Sampling temperature
    ///
    /// # Returns
    /// * `Result<Completion, ProviderError>` - The summary text and token usage, or an error
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<Completion, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod mock;
pub mod openai;
