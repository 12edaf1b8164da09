/*!
 * Subtitle summarization.
 *
 * - `chunker`: token-bounded grouping of subtitle entries
 * - `prompts`: user prompt templates and defaults
 * - `sink`: ordered accumulation of chunk summaries
 * - `pipeline`: the sequential parse, chunk and summarize run
 */

pub mod chunker;
pub mod pipeline;
pub mod prompts;
pub mod sink;

pub use chunker::{chunk_entries, Chunk, SubtitleChunker};
pub use pipeline::{PipelineEvent, PipelineState, SummaryFailure, SummaryOptions, SummaryPipeline, SummaryReport};
pub use prompts::PromptTemplate;
pub use sink::{progress_fraction, ResultSink, SUMMARY_DELIMITER};
