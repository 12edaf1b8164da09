/*!
 * Ordered accumulation of per-chunk summaries.
 */

/// Separator written after every chunk summary
pub const SUMMARY_DELIMITER: &str = "\n\n";

/// Growing summary output, one block per chunk in chunk order
#[derive(Debug, Clone, Default)]
pub struct ResultSink {
    /// Concatenated output as displayed
    buffer: String,
    /// Individual summaries, index i is chunk i + 1
    summaries: Vec<String>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next chunk's summary and return the whole buffer
    pub fn push(&mut self, summary: impl Into<String>) -> &str {
        let summary = summary.into();
        self.buffer.push_str(&summary);
        self.buffer.push_str(SUMMARY_DELIMITER);
        self.summaries.push(summary);
        &self.buffer
    }

    /// Everything produced so far
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Summaries in chunk order
    pub fn summaries(&self) -> &[String] {
        &self.summaries
    }

    /// Number of chunks summarized so far
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

/// Fraction of chunks completed, in 0.0..=1.0
pub fn progress_fraction(completed: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        completed.min(total) as f64 / total as f64
    }
}
