// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use summasub::app_config::{self, Config};
use summasub::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for summasub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// SummaSub - timestamped summaries of SRT subtitles
///
/// Splits a subtitle file into token-bounded chunks and asks an
/// OpenAI-compatible model for a short, timestamped summary of each one.
#[derive(Parser, Debug)]
#[command(name = "summasub")]
#[command(version)]
#[command(about = "Summarize SRT subtitles chunk by chunk with an LLM")]
#[command(long_about = "SummaSub splits an SRT file into chunks that fit a token budget and summarizes them in order.

EXAMPLES:
    summasub movie.srt                          # Summarize using default config
    summasub -m gpt-4o-mini movie.srt           # Use a specific model
    summasub --points 3 movie.srt               # Ask for three key points per chunk
    summasub -o out/ movie.srt                  # Also write out/movie.summary.txt
    summasub --dry-run movie.srt                # Show the chunk plan only
    summasub completions bash > summasub.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. The API key may also come from OPENAI_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// SRT file to summarize
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Model name used for tokenizing and completion
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the completion endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Token budget at which a chunk is closed
    #[arg(long)]
    max_tokens: Option<i64>,

    /// Key points requested per chunk
    #[arg(short, long)]
    points: Option<u32>,

    /// Sampling temperature
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Write the summary to this file, or into this directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Parse and chunk only, print the chunk plan without calling the API
    #[arg(long)]
    dry_run: bool,
}

impl CommandLineOptions {
    // @applies: CLI overrides on top of the loaded config
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = api_key.clone();
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens_per_chunk = max_tokens;
        }
        if let Some(points) = self.points {
            config.points_per_chunk = Some(points);
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(log_level) = &self.log_level {
            config.log_level = log_level.clone().into();
        }
    }
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger accepts everything; log::max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::decoration(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "summasub", &mut std::io::stdout());
        return Ok(());
    }

    run_summarize(cli).await
}

async fn run_summarize(options: CommandLineOptions) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let input = options.input.clone()
        .ok_or_else(|| anyhow!("INPUT is required when no subcommand is specified"))?;

    let mut config = Config::load_or_create(&options.config_path)?;
    options.apply_overrides(&mut config);
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    if options.dry_run {
        let chunks = controller.plan(&input)?;
        Controller::print_plan(&chunks);
        return Ok(());
    }

    let report = controller.run(input, options.output.clone()).await
        .context("Summarization failed")?;
    info!("Done: {} chunks summarized", report.chunk_count);

    Ok(())
}
