mod compile;
mod components;
pub(crate) mod config;
mod guard;
mod hast;
mod link_policy;
mod syntax;

use std::{sync::Arc, time::Instant};

use markdown::{mdast::Node, to_mdast};
use metrics::{counter, histogram};
use once_cell::sync::{Lazy, OnceCell};
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::render::types::{MdxError, MdxPipeline, RenderedNode};
use crate::cache::{CacheConfig, IdentityKey, RenderCache};
use crate::domain::error::UnsafeContentError;

use config::parse_options;
use hast::HastNode;
use syntax::SyntaxNode;

pub use hast::CompiledDocument;

pub(crate) const DEFAULT_MAX_SOURCE_BYTES: usize = 512 * 1024;

const METRIC_GUARD_REJECTED_TOTAL: &str = "mdx_guard_rejected_total";
const METRIC_COMPILE_MS: &str = "mdx_compile_ms";

/// MDX pipeline: parse, guard, build hypertext, apply the link policy, cache,
/// and bind to the built-in components.
pub struct MdxRenderService {
    config: RenderPipelineConfig,
    cache: Arc<RenderCache>,
}

impl MdxRenderService {
    pub fn new(config: RenderPipelineConfig, cache: Arc<RenderCache>) -> Self {
        Self { config, cache }
    }

    pub fn cache(&self) -> &Arc<RenderCache> {
        &self.cache
    }

    /// Runs the full compile without touching the cache.
    pub fn compile(&self, source: &str) -> Result<CompiledDocument, MdxError> {
        let started_at = Instant::now();

        size_stage(source, self.config.max_source_bytes)?;
        let document = parse_stage(source)?;
        let tree = guard_stage(&document)?;
        let mut nodes = compile_stage(&tree);
        link_policy_stage(&mut nodes);

        histogram!(METRIC_COMPILE_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);
        Ok(CompiledDocument::new(nodes))
    }
}

impl MdxPipeline for MdxRenderService {
    fn validate(&self, source: &str) -> Result<(), MdxError> {
        self.compile(source).map(|_| ())
    }

    fn render(&self, key: &IdentityKey, source: &str) -> Result<RenderedNode, MdxError> {
        if let Some(document) = self.cache.get(key) {
            debug!(
                target = "application::render::mdx",
                key = %key,
                result = "cache_hit",
                "Rendering cached document"
            );
            return Ok(components::instantiate(&document));
        }

        let document = Arc::new(self.compile(source)?);
        self.cache.insert(key.clone(), Arc::clone(&document));
        debug!(
            target = "application::render::mdx",
            key = %key,
            result = "compiled",
            blocks = document.block_count(),
            "Compiled document stored"
        );

        Ok(components::instantiate(&document))
    }
}

/// Validates on the blocking pool; the pipeline is CPU-bound.
pub async fn validate_mdx<P>(pipeline: Arc<P>, source: String) -> Result<(), MdxError>
where
    P: MdxPipeline + ?Sized + 'static,
{
    tokio::task::spawn_blocking(move || pipeline.validate(&source))
        .await
        .map_err(|err| MdxError::task(err.to_string()))?
}

/// Renders on the blocking pool; the pipeline is CPU-bound.
pub async fn render_mdx<P>(
    pipeline: Arc<P>,
    key: IdentityKey,
    source: String,
) -> Result<RenderedNode, MdxError>
where
    P: MdxPipeline + ?Sized + 'static,
{
    tokio::task::spawn_blocking(move || pipeline.render(&key, &source))
        .await
        .map_err(|err| MdxError::task(err.to_string()))?
}

#[derive(Debug, Clone)]
pub struct RenderPipelineConfig {
    pub max_source_bytes: usize,
}

impl Default for RenderPipelineConfig {
    fn default() -> Self {
        Self {
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
        }
    }
}

impl From<&crate::config::RenderSettings> for RenderPipelineConfig {
    fn from(settings: &crate::config::RenderSettings) -> Self {
        Self {
            max_source_bytes: settings.max_source_bytes.get(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderConfigError {
    #[error("render service already configured")]
    AlreadyConfigured,
}

#[derive(Debug, Clone, Default)]
struct SharedServiceConfig {
    pipeline: RenderPipelineConfig,
    cache: CacheConfig,
}

static RENDER_SERVICE_CONFIG: OnceCell<SharedServiceConfig> = OnceCell::new();

static RENDER_SERVICE: Lazy<Arc<MdxRenderService>> = Lazy::new(|| {
    let config = RENDER_SERVICE_CONFIG.get().cloned().unwrap_or_default();
    Arc::new(MdxRenderService::new(
        config.pipeline,
        Arc::new(RenderCache::new(&config.cache)),
    ))
});

/// Must run before the first call to [`render_service`]; later calls fail.
pub fn configure_render_service(
    pipeline: RenderPipelineConfig,
    cache: CacheConfig,
) -> Result<(), RenderConfigError> {
    RENDER_SERVICE_CONFIG
        .set(SharedServiceConfig { pipeline, cache })
        .map_err(|_| RenderConfigError::AlreadyConfigured)
}

/// Process-wide service with its own cache, initialised on first use.
pub fn render_service() -> Arc<MdxRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

fn size_stage(source: &str, limit: usize) -> Result<(), MdxError> {
    if source.len() > limit {
        return Err(MdxError::TooLarge {
            limit,
            actual: source.len(),
        });
    }
    Ok(())
}

fn parse_stage(source: &str) -> Result<Node, MdxError> {
    to_mdast(source, &parse_options()).map_err(|err| MdxError::parse(err.to_string()))
}

/// Lowering bounds the nesting depth, so it counts as part of the guard.
fn guard_stage(document: &Node) -> Result<SyntaxNode, UnsafeContentError> {
    syntax::lower(document)
        .and_then(|tree| guard::check(&tree).map(|()| tree))
        .inspect_err(|error| {
            counter!(METRIC_GUARD_REJECTED_TOTAL).increment(1);
            warn!(
                target = "application::render::guard",
                reason = %error.violation(),
                "Rejected unsafe MDX content"
            );
        })
}

fn compile_stage(tree: &SyntaxNode) -> Vec<HastNode> {
    compile::compile(tree)
}

fn link_policy_stage(nodes: &mut [HastNode]) {
    link_policy::apply(nodes);
}
