/*!
 * Prompt templates for subtitle summarization.
 *
 * A template is plain text with `{{...}}` placeholders. The content
 * placeholder is mandatory; the point count and response language are
 * substituted when the template contains them.
 */

use crate::errors::ConfigError;

/// System prompt sent alongside every summary request
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are ChatGPT, a large language model trained by OpenAI.";

/// Response language used when none is configured
pub const DEFAULT_LANGUAGE: &str = "Traditional Chinese";

/// User prompt template for a subtitle chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// Replaced by the chunk's serialized subtitles
    pub const CONTENT_PLACEHOLDER: &'static str = "{{your content here}}";

    /// Replaced by the desired number of key points
    pub const POINTS_PLACEHOLDER: &'static str = "{{points}}";

    /// Replaced by the response language
    pub const LANGUAGE_PLACEHOLDER: &'static str = "{{language}}";

    /// Summary prompt that lets the model choose how many points to make
    pub const SUMMARY: &'static str = r#"You have been assigned the role of a professional video summarizer. You will be given a subtitle file in SRT format.

Your task is to read through the subtitles, group together coherent topics into main points, and add the next point when you feel the conversation has moved on to the next topic. Your aim is to provide readers with the key points of the video immediately and allow them to jump to specific time points using the timestamps you provide.

When summarizing the points, you must also include the time range of the point in the video in the following format:

[(from timestamp) - (to timestamp)] - Summary of the point content.
Example:
[00:06:20,480 - 00:10:12,720] - Explains the defensive characteristics of bonds during economic recessions or market turbulence.

Start:

{{your content here}}

You may use context to determine the points. Please respond in {{language}}."#;

    /// Summary prompt that asks for a fixed number of points
    pub const SUMMARY_WITH_POINTS: &'static str = r#"You have been assigned the role of a professional video summarizer. You will be given a subtitle file in SRT format.

Your task is to read through the subtitles, group together coherent topics into main points, and add the next point when you feel the conversation has moved on to the next topic. Your aim is to provide readers with the key points of the video immediately and allow them to jump to specific time points using the timestamps you provide.

When summarizing the points, you must also include the time range of the point in the video in the following format:

[(from timestamp) - (to timestamp)] - Summary of the point content.
Example:
[00:06:20,480 - 00:10:12,720] - Explains the defensive characteristics of bonds during economic recessions or market turbulence.

Start:

{{your content here}}

Summarize the above into {{points}} key points. You may use context to determine the points. Please respond in {{language}}."#;

    /// Create a template, checking that it has the content placeholder
    pub fn new(template: &str) -> Result<Self, ConfigError> {
        if !template.contains(Self::CONTENT_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder(Self::CONTENT_PLACEHOLDER.to_string()));
        }
        Ok(Self {
            template: template.to_string(),
        })
    }

    /// Built-in template without a point count
    pub fn summary() -> Self {
        Self { template: Self::SUMMARY.to_string() }
    }

    /// Built-in template with a point count
    pub fn summary_with_points() -> Self {
        Self { template: Self::SUMMARY_WITH_POINTS.to_string() }
    }

    /// Whether this template asks for a number of points
    pub fn uses_points(&self) -> bool {
        self.template.contains(Self::POINTS_PLACEHOLDER)
    }

    /// Raw template text
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Render the template for one chunk
    ///
    /// `points` only matters when the template has a points placeholder;
    /// a template asking for points with none given is a configuration error.
    pub fn render(&self, content: &str, points: Option<u32>, language: &str) -> Result<String, ConfigError> {
        if !self.template.contains(Self::CONTENT_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder(Self::CONTENT_PLACEHOLDER.to_string()));
        }

        let mut rendered = self.template.replace(Self::LANGUAGE_PLACEHOLDER, language);

        if self.uses_points() {
            let points = points
                .ok_or(ConfigError::MissingPointCount)?;
            rendered = rendered.replace(Self::POINTS_PLACEHOLDER, &points.to_string());
        }

        // Content goes in last so subtitle text is never scanned for placeholders
        Ok(rendered.replace(Self::CONTENT_PLACEHOLDER, content))
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::summary_with_points()
    }
}
