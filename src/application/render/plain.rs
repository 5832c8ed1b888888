//! Plain Markdown rendering for content that is not MDX.
//!
//! Unlike the MDX pipeline this path never rejects input: embedded HTML is
//! rendered and then cleaned down to a safe subset.

use std::sync::Arc;

use comrak::markdown_to_html;
use once_cell::sync::Lazy;
use tracing::debug;

use super::service::config::{build_ugc_sanitizer, default_options};

pub struct MarkdownSanitizer {
    options: comrak::Options<'static>,
    sanitizer: ammonia::Builder<'static>,
}

impl MarkdownSanitizer {
    fn new() -> Self {
        Self {
            options: default_options(),
            sanitizer: build_ugc_sanitizer(),
        }
    }

    /// Renders Markdown to HTML with scripts, event handlers, inline styles,
    /// frames and non-web URL schemes removed. Links carry the UGC `rel`.
    pub fn render_to_html(&self, markdown: &str) -> String {
        let rendered = markdown_to_html(markdown, &self.options);
        let cleaned = self.sanitizer.clean(&rendered).to_string();
        debug!(
            target = "application::render::markdown",
            input_bytes = markdown.len(),
            rendered_bytes = rendered.len(),
            cleaned_bytes = cleaned.len(),
            "Sanitised markdown"
        );
        cleaned
    }
}

impl Default for MarkdownSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

static MARKDOWN_SANITIZER: Lazy<Arc<MarkdownSanitizer>> =
    Lazy::new(|| Arc::new(MarkdownSanitizer::new()));

pub fn markdown_sanitizer() -> Arc<MarkdownSanitizer> {
    Arc::clone(&MARKDOWN_SANITIZER)
}
