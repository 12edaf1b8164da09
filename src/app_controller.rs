use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::providers::openai::OpenAI;
use crate::providers::CompletionProvider;
use crate::subtitle_processor::SubtitleCollection;
use crate::summary::{
    chunk_entries, progress_fraction, Chunk, PipelineEvent, SummaryOptions, SummaryPipeline, SummaryReport,
};
use crate::token_counter::{TiktokenCounter, TokenCounter};

// @module: Application controller for subtitle summarization

/// Main application controller for subtitle summarization
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate_for_chunking()
            .context("Invalid chunking configuration")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Where the summary for `input_file` goes
    ///
    /// An existing directory gets `<stem>.summary.txt` inside it; anything
    /// else is used as the file path.
    pub fn resolve_output_path(input_file: &Path, output: &Path) -> PathBuf {
        if output.is_dir() {
            FileManager::generate_output_path(input_file, output, "txt")
        } else {
            output.to_path_buf()
        }
    }

    /// Parse and chunk a subtitle file without contacting the API
    pub fn plan(&self, input_file: &Path) -> Result<Vec<Chunk>> {
        let bytes = self.read_input(input_file)?;
        let counter = self.token_counter()?;

        let entries = SubtitleCollection::parse_srt_bytes(&bytes)
            .with_context(|| format!("Failed to parse subtitle file: {:?}", input_file))?;
        let chunks = chunk_entries(&entries, self.config.max_tokens_per_chunk, counter.as_ref())?;

        Ok(chunks)
    }

    /// Print a chunk plan, one line per chunk
    pub fn print_plan(chunks: &[Chunk]) {
        println!("{} chunks", chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let (first, last) = chunk.index_range();
            println!(
                "  #{:<4} {} subtitles {}-{} ({} entries, {} tokens)",
                i + 1,
                chunk.time_range_label(),
                first,
                last,
                chunk.len(),
                chunk.token_count()
            );
        }
    }

    /// Summarize a file against the configured OpenAI-compatible endpoint
    pub async fn run(&self, input_file: PathBuf, output: Option<PathBuf>) -> Result<SummaryReport> {
        self.config.validate()
            .context("Configuration validation failed")?;

        let provider = OpenAI::new(&self.config.client_config())?;
        info!("🚀 SummaSub: {} via {}", provider.model(), self.config.endpoint);

        self.run_with_provider(input_file, output, provider).await
    }

    /// Summarize a file with any completion provider
    ///
    /// The growing summary is printed as each chunk completes. When `output`
    /// is set the summary is written there at the end, or whatever was
    /// produced before a failure.
    pub async fn run_with_provider<P: CompletionProvider>(
        &self,
        input_file: PathBuf,
        output: Option<PathBuf>,
        provider: P,
    ) -> Result<SummaryReport> {
        let start_time = Instant::now();
        let bytes = self.read_input(&input_file)?;
        let output_path = output.map(|path| Self::resolve_output_path(&input_file, &path));

        let options = SummaryOptions::from_config(&self.config)
            .context("Invalid summary configuration")?;
        let mut pipeline = SummaryPipeline::new(provider, self.token_counter()?, options);

        let progress_bar = ProgressBar::hidden();
        let pb = progress_bar.clone();
        let result = pipeline.run(&bytes, move |event| match event {
            PipelineEvent::Planned { total_chunks } => {
                Self::start_progress_bar(&pb, total_chunks);
            }
            PipelineEvent::ChunkStarted { chunk_index, total_chunks, chunk } => {
                pb.set_message(format!("chunk {}/{} {}", chunk_index, total_chunks, chunk.time_range_label()));
            }
            PipelineEvent::ChunkCompleted { chunk_index, total_chunks, summary, .. } => {
                pb.suspend(|| println!("{}\n", summary));
                pb.set_position(chunk_index as u64);
                debug!("Progress {:.0}%", progress_fraction(chunk_index, total_chunks) * 100.0);
            }
        }).await;

        match result {
            Ok(report) => {
                progress_bar.finish_and_clear();
                if let Some(path) = &output_path {
                    FileManager::write_to_file(path, report.summary())?;
                    info!("Summary written to {:?}", path);
                }
                info!(
                    "Summary completed in {}: {} chunks, {} tokens.",
                    Self::format_duration(start_time.elapsed()),
                    report.chunk_count,
                    report.total_tokens
                );
                Ok(report)
            }
            Err(failure) => {
                progress_bar.abandon();
                if let Some(path) = &output_path {
                    if !failure.partial.is_empty() {
                        FileManager::write_to_file(path, failure.partial.as_str())?;
                        warn!("Partial summary ({} chunks) written to {:?}", failure.partial.len(), path);
                    }
                }
                Err(anyhow!(failure))
                    .with_context(|| format!("Failed to summarize {:?}", input_file))
            }
        }
    }

    fn read_input(&self, input_file: &Path) -> Result<Vec<u8>> {
        if !FileManager::is_subtitle_file(input_file) {
            warn!("{:?} does not have an .srt extension, parsing it as SRT anyway", input_file);
        }
        FileManager::read_bytes(input_file)
    }

    fn token_counter(&self) -> Result<Box<dyn TokenCounter>> {
        Ok(Box::new(TiktokenCounter::for_model(&self.config.model)?))
    }

    fn start_progress_bar(progress_bar: &ProgressBar, total_chunks: usize) {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_length(total_chunks as u64);
        progress_bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        progress_bar.set_message("Summarizing");
    }

    /// Format a duration as e.g. "1h 2m 3s", "2m 3s" or "3.250s"
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
