//! Rendering of untrusted author content.
//!
//! MDX goes through a pure, fail-closed pipeline: parse, guard the syntax
//! tree against the allow-list, build a hypertext tree, neutralise unsafe
//! URLs, cache the compiled document, and expand the built-in components.
//! Plain Markdown is rendered and sanitised instead of rejected.

mod html;
mod plain;
mod service;
mod types;

pub use plain::{MarkdownSanitizer, markdown_sanitizer};
pub use service::{
    CompiledDocument, MdxRenderService, RenderConfigError, RenderPipelineConfig,
    configure_render_service, render_mdx, render_service, validate_mdx,
};
pub use types::{Attribute, MdxError, MdxPipeline, PUBLIC_FALLBACK_MESSAGE, RenderedNode};
