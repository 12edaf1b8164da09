use anyhow::{Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::errors::ConfigError;
use crate::summary::prompts::{PromptTemplate, DEFAULT_LANGUAGE, DEFAULT_SYSTEM_PROMPT};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// API key forwarded to the completion endpoint
    #[serde(default)]
    pub api_key: String,

    /// Model name; selects both tokenizer and completion model
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Token threshold at which a chunk is closed
    #[serde(default = "default_max_tokens_per_chunk")]
    pub max_tokens_per_chunk: i64,

    /// Number of key points requested per chunk (point-count prompt only)
    #[serde(default = "default_points_per_chunk")]
    pub points_per_chunk: Option<u32>,

    /// Temperature parameter for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// System prompt sent with every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Custom user prompt template; must contain `{{your content here}}`
    #[serde(default)]
    pub prompt_template: Option<String>,

    /// Language the summary should be written in
    #[serde(default = "default_language")]
    pub language: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Settings the completion client is constructed with
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API key for authentication
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Base URL of the API
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching filter for the log facade
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_tokens_per_chunk() -> i64 {
    2300
}

fn default_points_per_chunk() -> Option<u32> {
    Some(2)
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Config {
    /// Load configuration from a JSON file, creating a default one if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        self.validate_for_chunking()?;

        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }

        let url = Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        // Rendering checks the point count against the template
        self.prompt_template()?.render("", self.points_per_chunk, &self.language)?;

        Ok(())
    }

    /// Checks needed to parse and chunk without talking to the API
    pub fn validate_for_chunking(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingModel);
        }
        if self.max_tokens_per_chunk <= 0 {
            return Err(ConfigError::InvalidChunkSize(self.max_tokens_per_chunk));
        }
        Ok(())
    }

    /// The user prompt template for this configuration
    ///
    /// A custom template wins; otherwise the point-count variant is used
    /// whenever `points_per_chunk` is set.
    pub fn prompt_template(&self) -> Result<PromptTemplate, ConfigError> {
        match &self.prompt_template {
            Some(template) => PromptTemplate::new(template),
            None if self.points_per_chunk.is_some() => Ok(PromptTemplate::summary_with_points()),
            None => Ok(PromptTemplate::summary()),
        }
    }

    /// Settings for the completion client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: String::new(),
            model: default_model(),
            endpoint: default_endpoint(),
            max_tokens_per_chunk: default_max_tokens_per_chunk(),
            points_per_chunk: default_points_per_chunk(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            system_prompt: default_system_prompt(),
            prompt_template: None,
            language: default_language(),
            log_level: LogLevel::default(),
        }
    }
}
