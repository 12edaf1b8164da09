/*!
 * # SummaSub - timestamped summaries of SRT subtitles
 *
 * A Rust library for summarizing video subtitles with an LLM, chunk by chunk.
 *
 * ## Features
 *
 * - Strict SRT parsing with line-numbered errors
 * - Token-bounded chunking using the target model's tokenizer
 * - One OpenAI-compatible chat completion per chunk, strictly in order
 * - Timestamped key points in a configurable response language
 * - Partial output kept when a request fails
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Subtitle parsing and rendering
 * - `token_counter`: Token counting behind the `TokenCounter` trait
 * - `summary`: Summarization:
 *   - `summary::chunker`: Token-bounded chunking
 *   - `summary::prompts`: Prompt templates
 *   - `summary::sink`: Ordered result accumulation
 *   - `summary::pipeline`: The sequential run and its state machine
 * - `providers`: Completion clients:
 *   - `providers::openai`: OpenAI-compatible API client
 *   - `providers::mock`: Scripted provider for tests
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod token_counter;
pub mod summary;
pub mod app_controller;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use token_counter::{HeuristicTokenCounter, TiktokenCounter, TokenCounter};
pub use summary::{chunk_entries, Chunk, ResultSink, SummaryPipeline, SummaryReport};
pub use errors::{AppError, ConfigError, ProviderError, SubtitleError, SummaryError};
