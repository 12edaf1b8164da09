use std::fmt;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context};
use log::{warn, debug};

use crate::errors::SubtitleError;
use crate::file_utils::FileManager;

// @module: Subtitle parsing and rendering

// @const: SRT timing line regex (trailing position coordinates are ignored)
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{3})").unwrap()
});

// @const: UTF-8 byte order mark
const BOM: char = '\u{feff}';

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Milliseconds for an `HH:MM:SS,mmm` timestamp, `None` when out of range
    pub fn timestamp_to_ms(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<u64> {
        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return None;
        }

        hours.checked_mul(3_600_000)?
            .checked_add(minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Where the parser is inside the current block
enum BlockState {
    /// Between blocks, waiting for an index line
    Index,
    /// Index read, timing line must follow
    Timing { index: usize },
    /// Collecting text lines until a blank line
    Text { index: usize, start_ms: u64, end_ms: u64, lines: Vec<String> },
}

/// Collection of subtitle entries with metadata
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries, in file order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create a new, empty subtitle collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Read and parse an SRT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = FileManager::read_bytes(path)?;
        let entries = Self::parse_srt_bytes(&bytes)
            .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))?;

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries,
        })
    }

    /// Decode raw bytes and parse them as SRT
    pub fn parse_srt_bytes(bytes: &[u8]) -> std::result::Result<Vec<SubtitleEntry>, SubtitleError> {
        let content = std::str::from_utf8(bytes)
            .map_err(|e| SubtitleError::InvalidEncoding(e.to_string()))?;
        Self::parse_srt_string(content)
    }

    /// Parse SRT format string into subtitle entries
    ///
    /// Every block is an index line, a timing line, any number of text lines
    /// and a terminating blank line (or end of input). Malformed blocks are
    /// rejected with the 1-based line number of the offending line.
    pub fn parse_srt_string(content: &str) -> std::result::Result<Vec<SubtitleEntry>, SubtitleError> {
        let content = content.strip_prefix(BOM).unwrap_or(content);
        let mut entries: Vec<SubtitleEntry> = Vec::new();
        let mut state = BlockState::Index;
        let mut line_count = 0;

        for line in content.lines() {
            line_count += 1;
            let trimmed = line.trim();

            state = match state {
                BlockState::Index => {
                    if trimmed.is_empty() {
                        BlockState::Index
                    } else {
                        let index = Self::parse_index(trimmed, line_count)?;
                        BlockState::Timing { index }
                    }
                }
                BlockState::Timing { index } => {
                    let (start_ms, end_ms) = Self::parse_timing_line(trimmed, line_count, index)?;
                    BlockState::Text { index, start_ms, end_ms, lines: Vec::new() }
                }
                BlockState::Text { index, start_ms, end_ms, mut lines } => {
                    if trimmed.is_empty() {
                        Self::push_entry(&mut entries, index, start_ms, end_ms, lines);
                        BlockState::Index
                    } else if TIMESTAMP_REGEX.is_match(trimmed) {
                        return Err(SubtitleError::MissingSeparator { line: line_count, index });
                    } else {
                        lines.push(line.trim_end().to_string());
                        BlockState::Text { index, start_ms, end_ms, lines }
                    }
                }
            };
        }

        match state {
            BlockState::Index => {}
            BlockState::Timing { index } => {
                return Err(SubtitleError::MissingTimestamp { line: line_count + 1, index });
            }
            BlockState::Text { index, start_ms, end_ms, lines } => {
                Self::push_entry(&mut entries, index, start_ms, end_ms, lines);
            }
        }

        if entries.is_empty() {
            warn!("No subtitle entries found in content");
        } else {
            debug!("Parsed {} subtitle entries", entries.len());
        }

        Ok(entries)
    }

    /// Parse the index line of a block
    fn parse_index(line: &str, line_number: usize) -> std::result::Result<usize, SubtitleError> {
        match line.parse::<usize>() {
            Ok(index) if index >= 1 => Ok(index),
            _ => Err(SubtitleError::InvalidIndex {
                line: line_number,
                value: line.to_string(),
            }),
        }
    }

    /// Parse the timing line of a block into start and end milliseconds
    fn parse_timing_line(line: &str, line_number: usize, index: usize) -> std::result::Result<(u64, u64), SubtitleError> {
        let invalid = || SubtitleError::InvalidTimestamp {
            line: line_number,
            value: line.to_string(),
        };

        let Some(caps) = TIMESTAMP_REGEX.captures(line) else {
            // Anything without an arrow is not an attempt at a timing line
            return Err(if line.contains("-->") {
                invalid()
            } else {
                SubtitleError::MissingTimestamp { line: line_number, index }
            });
        };

        let start_ms = Self::parse_timestamp_to_ms(&caps, 1).ok_or_else(invalid)?;
        let end_ms = Self::parse_timestamp_to_ms(&caps, 5).ok_or_else(invalid)?;

        if end_ms < start_ms {
            warn!("Subtitle {} ends before it starts ({} < {})", index, end_ms, start_ms);
        }

        Ok((start_ms, end_ms))
    }

    /// Parse timestamp captures starting at `start_idx` to milliseconds
    fn parse_timestamp_to_ms(caps: &regex::Captures, start_idx: usize) -> Option<u64> {
        let part = |offset: usize| -> Option<u64> {
            caps.get(start_idx + offset)?.as_str().parse().ok()
        };

        SubtitleEntry::timestamp_to_ms(part(0)?, part(1)?, part(2)?, part(3)?)
    }

    fn push_entry(entries: &mut Vec<SubtitleEntry>, index: usize, start_ms: u64, end_ms: u64, lines: Vec<String>) {
        if let Some(previous) = entries.last() {
            if index <= previous.seq_num {
                warn!("Subtitle index {} does not follow {}", index, previous.seq_num);
            }
        }
        entries.push(SubtitleEntry::new(index, start_ms, end_ms, lines.join("\n")));
    }

    /// Render the collection back to SRT
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }

    /// Start of the first entry and end of the last one
    pub fn time_span(&self) -> Option<(u64, u64)> {
        let first = self.entries.first()?;
        let last = self.entries.last()?;
        Some((first.start_time_ms, last.end_time_ms))
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
