/*!
 * Mock provider implementation for tests and dry runs.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with a canned summary
 * - `MockProvider::fail_on_call(n)` - Succeeds until the n-th request, which fails
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::malformed()` - Answers with an unusable response shape
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::{Completion, CompletionProvider};

/// A request as seen by the mock provider
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// System prompt
    pub system_prompt: String,
    /// Rendered user prompt
    pub user_prompt: String,
    /// Requested temperature
    pub temperature: f32,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails on the given 1-based request number, succeeds otherwise
    FailOnCall { call: usize },
    /// Always fails with an API error
    Failing,
    /// Succeeds at the transport level but the response has no text
    Malformed,
}

/// Mock provider for testing summary runs
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<MockRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Tokens reported for every successful request
    pub const TOKENS_PER_REQUEST: u64 = 42;

    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock provider that fails on the given request number
    pub fn fail_on_call(call: usize) -> Self {
        Self::new(MockBehavior::FailOnCall { call })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns responses without any text
    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn respond(&self, call: usize, request: &MockRequest) -> Completion {
        let text = match self.custom_response {
            Some(generator) => generator(request),
            None => format!("Summary {}", call),
        };
        Completion::new(text, Self::TOKENS_PER_REQUEST)
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<Completion, ProviderError> {
        let call = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        let request = MockRequest {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            temperature,
        };
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match self.behavior {
            MockBehavior::Working => Ok(self.respond(call, &request)),

            MockBehavior::FailOnCall { call: failing_call } if call == failing_call => {
                Err(ProviderError::ApiError {
                    message: format!("Simulated failure (request #{})", call),
                    status_code: 503,
                })
            }

            MockBehavior::FailOnCall { .. } => Ok(self.respond(call, &request)),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Malformed => Err(ProviderError::MalformedResponse(
                "response has neither message content nor text".to_string(),
            )),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated connection failure".to_string())),
            _ => Ok(()),
        }
    }
}
