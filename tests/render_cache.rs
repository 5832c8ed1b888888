use std::sync::Arc;

use mdx_guard::application::render::{
    MdxError, MdxPipeline, MdxRenderService, RenderPipelineConfig, render_mdx, validate_mdx,
};
use mdx_guard::cache::{CacheConfig, IdentityKey, RenderCache};
use time::macros::datetime;

fn service_with(config: CacheConfig) -> MdxRenderService {
    MdxRenderService::new(
        RenderPipelineConfig::default(),
        Arc::new(RenderCache::new(&config)),
    )
}

fn service() -> MdxRenderService {
    service_with(CacheConfig::default())
}

#[test]
fn rendering_is_idempotent_for_a_key() {
    let service = service();
    let key = IdentityKey::versioned("post-1", datetime!(2024-05-01 10:00 UTC));
    let source = "# Title\n\n<Callout title=\"Hi\">Body</Callout>";

    let first = service.render(&key, source).expect("first render");
    let second = service.render(&key, source).expect("second render");

    assert_eq!(first, second);
    assert_eq!(service.cache().len(), 1);
}

#[test]
fn cache_hits_are_served_without_recompiling() {
    let service = service();
    let key = IdentityKey::new("post-2@1");

    let original = service
        .render(&key, "Original body")
        .expect("original renders");

    // The cache trusts the key; a different source under the same key is
    // never looked at.
    let cached = service
        .render(&key, "{changed}")
        .expect("served from cache");

    assert_eq!(original, cached);
    assert_eq!(cached.text_content(), "Original body");
}

#[test]
fn new_key_sees_new_content() {
    let service = service();
    let old_key = IdentityKey::content_addressed("post-3", "Old");
    let new_key = IdentityKey::content_addressed("post-3", "New");
    assert_ne!(old_key, new_key);

    service.render(&old_key, "Old").expect("old renders");
    let updated = service.render(&new_key, "New").expect("new renders");

    assert_eq!(updated.text_content(), "New");
    assert_eq!(service.cache().len(), 2);
}

#[test]
fn rejected_documents_are_never_cached() {
    let service = service();
    let key = IdentityKey::new("post-4@1");

    let error = service
        .render(&key, "import x from 'y'")
        .expect_err("esm is rejected");
    assert!(error.as_unsafe().is_some());
    assert!(!service.cache().contains(&key));

    // The same key can still be rendered once the content is fixed.
    service.render(&key, "fixed").expect("valid source renders");
    assert!(service.cache().contains(&key));
}

#[test]
fn validate_never_touches_the_cache() {
    let service = service();
    service.validate("# fine").expect("valid");
    assert!(service.cache().is_empty());
}

#[test]
fn disabled_cache_compiles_every_time() {
    let service = service_with(CacheConfig {
        enabled: false,
        ..CacheConfig::default()
    });
    let key = IdentityKey::new("post-5@1");

    service.render(&key, "first").expect("renders");
    let second = service.render(&key, "second").expect("renders");

    assert_eq!(second.text_content(), "second");
    assert!(service.cache().is_empty());
}

#[test]
fn least_recently_used_document_is_evicted() {
    let service = service_with(CacheConfig {
        enabled: true,
        capacity: 2,
    });
    let a = IdentityKey::new("a");
    let b = IdentityKey::new("b");
    let c = IdentityKey::new("c");

    service.render(&a, "a").expect("renders");
    service.render(&b, "b").expect("renders");
    service.render(&a, "a").expect("hit refreshes a");
    service.render(&c, "c").expect("renders");

    assert!(service.cache().contains(&a));
    assert!(!service.cache().contains(&b));
    assert!(service.cache().contains(&c));
}

#[test]
fn cache_is_shared_between_services() {
    let cache = Arc::new(RenderCache::new(&CacheConfig::default()));
    let writer = MdxRenderService::new(RenderPipelineConfig::default(), Arc::clone(&cache));
    let reader = MdxRenderService::new(RenderPipelineConfig::default(), Arc::clone(&cache));
    let key = IdentityKey::new("shared");

    writer.render(&key, "from writer").expect("renders");
    let served = reader.render(&key, "ignored").expect("served from cache");

    assert_eq!(served.text_content(), "from writer");
}

#[test]
fn tabs_render_through_the_cache() {
    let service = service();
    let source = "<Tabs>\n<Tab label=\"One\">\nfirst\n</Tab>\n<Tab label=\"Two\">\nsecond\n</Tab>\n</Tabs>";
    let document = service
        .render(&IdentityKey::new("tabs"), source)
        .expect("renders");

    let html = document.to_html();
    assert!(html.contains("data-role=\"tabs\""));
    assert!(html.contains("role=\"tablist\""));
    assert!(html.contains("data-label=\"One\""));
    assert!(html.contains("data-label=\"Two\""));
    assert!(html.contains("hidden=\"\""));
}

#[tokio::test]
async fn async_render_runs_on_blocking_pool() {
    let service = Arc::new(service());

    let node = render_mdx(
        Arc::clone(&service),
        IdentityKey::new("async"),
        "<Details summary=\"More\">Hidden</Details>".to_string(),
    )
    .await
    .expect("renders");

    assert!(node.to_html().contains("<summary>More</summary>"));
    assert_eq!(service.cache().len(), 1);
}

#[tokio::test]
async fn async_validate_surfaces_guard_errors() {
    let pipeline: Arc<dyn MdxPipeline> = Arc::new(service());

    let error = validate_mdx(pipeline, "<Callout title={1} />".to_string())
        .await
        .expect_err("expression attribute is rejected");

    match error {
        MdxError::Unsafe(unsafe_error) => assert_eq!(
            unsafe_error.reason(),
            "attribute value expressions are not allowed"
        ),
        other => panic!("unexpected error: {other:?}"),
    }
}
