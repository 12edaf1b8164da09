/*!
 * Token-bounded chunking of subtitle entries.
 *
 * Entries are accumulated in order until the running token total reaches the
 * threshold. The entry that reaches it is not part of the chunk being closed:
 * it becomes the first entry of the next chunk. An entry that is over budget
 * on its own therefore always ends up alone in its chunk, never split.
 */

use std::fmt;

use log::{debug, error};

use crate::errors::ConfigError;
use crate::subtitle_processor::SubtitleEntry;
use crate::token_counter::TokenCounter;

/// A contiguous run of subtitle entries sent as one summary request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Entries in original order, never empty
    entries: Vec<SubtitleEntry>,
    /// Sum of the per-entry token costs
    token_count: usize,
}

impl Chunk {
    fn new(entries: Vec<SubtitleEntry>, token_count: usize) -> Self {
        debug_assert!(!entries.is_empty());
        Self { entries, token_count }
    }

    /// Entries in this chunk
    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    /// Number of entries in this chunk
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; chunks are never empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Token cost accumulated while building the chunk
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Sequence numbers of the first and last entry
    pub fn index_range(&self) -> (usize, usize) {
        (self.first().seq_num, self.last().seq_num)
    }

    /// Start of the first entry and end of the last one, in milliseconds
    pub fn time_range(&self) -> (u64, u64) {
        (self.first().start_time_ms, self.last().end_time_ms)
    }

    /// Time range as `[HH:MM:SS,mmm - HH:MM:SS,mmm]`
    pub fn time_range_label(&self) -> String {
        let (start, end) = self.time_range();
        format!(
            "[{} - {}]",
            SubtitleEntry::format_timestamp(start),
            SubtitleEntry::format_timestamp(end)
        )
    }

    /// The entries re-rendered in SRT form, as sent to the model
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    fn first(&self) -> &SubtitleEntry {
        &self.entries[0]
    }

    fn last(&self) -> &SubtitleEntry {
        &self.entries[self.entries.len() - 1]
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// Accumulator owned by one chunking run
#[derive(Debug, Default)]
struct ChunkingState {
    entries: Vec<SubtitleEntry>,
    running_total: usize,
}

impl ChunkingState {
    /// Close the current accumulator, if it holds anything
    fn take_chunk(&mut self) -> Option<Chunk> {
        if self.entries.is_empty() {
            return None;
        }
        let entries = std::mem::take(&mut self.entries);
        let total = std::mem::take(&mut self.running_total);
        Some(Chunk::new(entries, total))
    }
}

/// Splits subtitle entries into chunks bounded by a token threshold
pub struct SubtitleChunker<'a> {
    max_tokens: usize,
    counter: &'a dyn TokenCounter,
}

impl<'a> SubtitleChunker<'a> {
    /// Create a chunker, rejecting non-positive thresholds
    pub fn new(max_tokens: i64, counter: &'a dyn TokenCounter) -> Result<Self, ConfigError> {
        let max_tokens = usize::try_from(max_tokens)
            .ok()
            .filter(|max| *max > 0)
            .ok_or(ConfigError::InvalidChunkSize(max_tokens))?;

        Ok(Self { max_tokens, counter })
    }

    /// Threshold at which a chunk is closed
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Split `entries` into chunks, preserving order
    pub fn chunk(&self, entries: &[SubtitleEntry]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut state = ChunkingState::default();

        for entry in entries {
            let cost = self.counter.count_tokens(&entry.text);
            state.running_total += cost;

            if state.running_total >= self.max_tokens {
                // The overflowing entry seeds the next chunk
                if let Some(chunk) = state.take_chunk() {
                    chunks.push(chunk);
                }
                state.entries.push(entry.clone());
                state.running_total = cost;
            } else {
                state.entries.push(entry.clone());
            }
        }

        if let Some(chunk) = state.take_chunk() {
            chunks.push(chunk);
        }

        self.log_chunks(entries.len(), &chunks);
        chunks
    }

    fn log_chunks(&self, total_entries: usize, chunks: &[Chunk]) {
        let total_chunked_entries: usize = chunks.iter().map(Chunk::len).sum();
        if total_chunked_entries != total_entries {
            error!("Lost entries during chunking! Original: {}, After chunking: {}",
                   total_entries, total_chunked_entries);
            return;
        }

        if log::max_level() >= log::LevelFilter::Debug {
            for (i, chunk) in chunks.iter().enumerate() {
                let (first, last) = chunk.index_range();
                debug!("Chunk {}: {} entries (seq_nums {}..={}, {} tokens, limit {})",
                       i + 1, chunk.len(), first, last, chunk.token_count(), self.max_tokens);
            }
        }
    }
}

/// Split `entries` into token-bounded chunks
///
/// Fails with `ConfigError::InvalidChunkSize` when `max_tokens` is not positive.
pub fn chunk_entries(
    entries: &[SubtitleEntry],
    max_tokens: i64,
    counter: &dyn TokenCounter,
) -> Result<Vec<Chunk>, ConfigError> {
    Ok(SubtitleChunker::new(max_tokens, counter)?.chunk(entries))
}
