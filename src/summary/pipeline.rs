/*!
 * Sequential summary pipeline.
 *
 * One run goes `Idle -> Parsing -> Chunking -> Summarizing(1..=N) -> Done`.
 * Any error moves the run to `Failed`, which keeps whatever summaries were
 * already produced. Chunks are summarized strictly one after another and the
 * first provider error stops the run: later chunks are never requested.
 */

use std::fmt;
use std::time::Instant;

use log::{debug, error, info};
use thiserror::Error;

use crate::app_config::Config;
use crate::errors::{ConfigError, SummaryError};
use crate::providers::CompletionProvider;
use crate::subtitle_processor::SubtitleCollection;
use crate::token_counter::TokenCounter;

use super::chunker::{chunk_entries, Chunk};
use super::prompts::{PromptTemplate, DEFAULT_LANGUAGE, DEFAULT_SYSTEM_PROMPT};
use super::sink::ResultSink;

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Parsing,
    Chunking,
    /// Waiting on the completion for chunk `current` of `total`
    Summarizing { current: usize, total: usize },
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Parsing => write!(f, "parsing"),
            Self::Chunking => write!(f, "chunking"),
            Self::Summarizing { current, total } => write!(f, "summarizing {}/{}", current, total),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Progress notifications emitted during a run
#[derive(Debug)]
pub enum PipelineEvent<'a> {
    /// Input parsed and split
    Planned { total_chunks: usize },
    /// A request for this chunk is about to be sent
    ChunkStarted { chunk_index: usize, total_chunks: usize, chunk: &'a Chunk },
    /// A chunk's summary was appended; `buffer` is the whole output so far
    ChunkCompleted { chunk_index: usize, total_chunks: usize, summary: &'a str, buffer: &'a str },
}

/// Per-run settings taken from the configuration
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub max_tokens_per_chunk: i64,
    pub points_per_chunk: Option<u32>,
    pub temperature: f32,
    pub system_prompt: String,
    pub language: String,
    pub template: PromptTemplate,
}

impl SummaryOptions {
    /// Build options from a configuration, checking chunk size and template
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate_for_chunking()?;
        let options = Self {
            max_tokens_per_chunk: config.max_tokens_per_chunk,
            points_per_chunk: config.points_per_chunk,
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
            language: config.language.clone(),
            template: config.prompt_template()?,
        };
        options.render_prompt("")?;
        Ok(options)
    }

    /// Render the user prompt for a chunk's serialized text
    pub fn render_prompt(&self, content: &str) -> Result<String, ConfigError> {
        self.template.render(content, self.points_per_chunk, &self.language)
    }
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            max_tokens_per_chunk: 2300,
            points_per_chunk: Some(2),
            temperature: 0.7,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            template: PromptTemplate::default(),
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct SummaryReport {
    /// Every chunk's summary, in order
    pub sink: ResultSink,
    /// Number of chunks summarized
    pub chunk_count: usize,
    /// Token usage reported by the provider, summed over all requests
    pub total_tokens: u64,
}

impl SummaryReport {
    /// The full output text
    pub fn summary(&self) -> &str {
        self.sink.as_str()
    }
}

/// A failed run: the error plus the output produced before it
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SummaryFailure {
    /// Summaries of the chunks that completed before the failure
    pub partial: ResultSink,
    /// What went wrong
    #[source]
    pub error: SummaryError,
}

impl SummaryFailure {
    fn new(partial: ResultSink, error: impl Into<SummaryError>) -> Self {
        Self {
            partial,
            error: error.into(),
        }
    }
}

/// Runs parse, chunk and summarize for one subtitle file
pub struct SummaryPipeline<P: CompletionProvider> {
    provider: P,
    counter: Box<dyn TokenCounter>,
    options: SummaryOptions,
    state: PipelineState,
}

impl<P: CompletionProvider> SummaryPipeline<P> {
    pub fn new(provider: P, counter: Box<dyn TokenCounter>, options: SummaryOptions) -> Self {
        Self {
            provider,
            counter,
            options,
            state: PipelineState::Idle,
        }
    }

    /// Current state of the run
    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn options(&self) -> &SummaryOptions {
        &self.options
    }

    /// Parse and chunk the input without sending any request
    pub fn plan(&mut self, input: &[u8]) -> Result<Vec<Chunk>, SummaryError> {
        self.state = PipelineState::Parsing;
        let result = self.parse_and_chunk(input);
        if result.is_err() {
            self.state = PipelineState::Failed;
        }
        result
    }

    fn parse_and_chunk(&mut self, input: &[u8]) -> Result<Vec<Chunk>, SummaryError> {
        let entries = SubtitleCollection::parse_srt_bytes(input)?;

        self.state = PipelineState::Chunking;
        let chunks = chunk_entries(&entries, self.options.max_tokens_per_chunk, self.counter.as_ref())?;
        info!("Split {} subtitles into {} chunks", entries.len(), chunks.len());

        Ok(chunks)
    }

    /// Run the whole pipeline over raw subtitle bytes
    pub async fn run<F>(&mut self, input: &[u8], mut observer: F) -> Result<SummaryReport, SummaryFailure>
    where
        F: FnMut(PipelineEvent<'_>),
    {
        let chunks = self.plan(input)
            .map_err(|e| SummaryFailure::new(ResultSink::new(), e))?;
        observer(PipelineEvent::Planned { total_chunks: chunks.len() });

        self.summarize_chunks(&chunks, observer).await
    }

    /// Summarize already planned chunks, in order
    pub async fn summarize_chunks<F>(&mut self, chunks: &[Chunk], mut observer: F) -> Result<SummaryReport, SummaryFailure>
    where
        F: FnMut(PipelineEvent<'_>),
    {
        let total_chunks = chunks.len();
        let mut sink = ResultSink::new();
        let mut total_tokens: u64 = 0;
        let start_time = Instant::now();

        // Template problems surface before the first request
        if let Err(e) = self.options.render_prompt("") {
            self.state = PipelineState::Failed;
            return Err(SummaryFailure::new(sink, e));
        }

        for (i, chunk) in chunks.iter().enumerate() {
            let chunk_index = i + 1;
            self.state = PipelineState::Summarizing { current: chunk_index, total: total_chunks };
            observer(PipelineEvent::ChunkStarted { chunk_index, total_chunks, chunk });

            let user_prompt = match self.options.render_prompt(&chunk.serialize()) {
                Ok(prompt) => prompt,
                Err(e) => {
                    self.state = PipelineState::Failed;
                    return Err(SummaryFailure::new(sink, e));
                }
            };

            debug!("Summarizing chunk {}/{} {} ({} tokens)",
                   chunk_index, total_chunks, chunk.time_range_label(), chunk.token_count());

            let completion = match self.provider
                .complete(&self.options.system_prompt, &user_prompt, self.options.temperature)
                .await
            {
                Ok(completion) => completion,
                Err(source) => {
                    error!("Chunk {}/{} failed: {}", chunk_index, total_chunks, source);
                    self.state = PipelineState::Failed;
                    let error = SummaryError::Chunk { chunk_index, total_chunks, source };
                    return Err(SummaryFailure::new(sink, error));
                }
            };

            total_tokens += completion.total_tokens;
            let summary = completion.text.trim_end();
            let buffer = sink.push(summary);
            observer(PipelineEvent::ChunkCompleted { chunk_index, total_chunks, summary, buffer });
        }

        self.state = PipelineState::Done;
        info!("Summarized {} chunks in {:.1}s using {} tokens",
              total_chunks, start_time.elapsed().as_secs_f64(), total_tokens);

        Ok(SummaryReport {
            sink,
            chunk_count: total_chunks,
            total_tokens,
        })
    }
}
