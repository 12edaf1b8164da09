/*!
 * Token counting for chunk budgeting.
 *
 * The chunker only needs to know what a piece of text costs, so the
 * tokenizer sits behind the `TokenCounter` trait. Swapping models means
 * swapping the counter, never the chunking algorithm.
 */

use std::fmt;

use anyhow::{Result, anyhow};
use log::{debug, warn};
use tiktoken_rs::CoreBPE;

/// Capability to count tokens for a piece of text
pub trait TokenCounter: Send + Sync {
    /// Number of tokens `text` costs under this counter's encoding
    fn count_tokens(&self, text: &str) -> usize;
}

/// Plain functions and closures work as counters, which keeps tests short
impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn count_tokens(&self, text: &str) -> usize {
        self(text)
    }
}

/// BPE token counter matching the target model's tokenizer
pub struct TiktokenCounter {
    /// Encoder for the selected model
    bpe: CoreBPE,
    /// Model the encoder was selected for
    model: String,
}

impl TiktokenCounter {
    /// Encoding used when a model name is not known to tiktoken
    pub const FALLBACK_ENCODING: &'static str = "cl100k_base";

    /// Create a counter for the given model name
    ///
    /// Unknown models fall back to `cl100k_base`, the encoding of the
    /// chat-completion model family.
    pub fn for_model(model: &str) -> Result<Self> {
        let bpe = match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => bpe,
            Err(e) => {
                warn!("No tokenizer known for model '{}' ({}), using {}", model, e, Self::FALLBACK_ENCODING);
                tiktoken_rs::cl100k_base()
                    .map_err(|e| anyhow!("Failed to load {} tokenizer: {}", Self::FALLBACK_ENCODING, e))?
            }
        };
        debug!("Token counter ready for model {}", model);

        Ok(Self {
            bpe,
            model: model.to_string(),
        })
    }

    /// The model this counter was built for
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

impl fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TiktokenCounter")
            .field("model", &self.model)
            .finish()
    }
}

/// Rough estimate of ~4 bytes per token, for when no tokenizer is available
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenCounter;

impl HeuristicTokenCounter {
    const BYTES_PER_TOKEN: usize = 4;
}

impl TokenCounter for HeuristicTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            0
        } else {
            (text.len() / Self::BYTES_PER_TOKEN).max(1)
        }
    }
}
