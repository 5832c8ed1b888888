use std::sync::Arc;

use mdx_guard::application::render::{
    MdxPipeline, MdxRenderService, RenderPipelineConfig, RenderedNode,
};
use mdx_guard::cache::{CacheConfig, IdentityKey, RenderCache};

const UGC_REL: &str = "nofollow ugc noopener noreferrer";

fn render(source: &str) -> RenderedNode {
    let service = MdxRenderService::new(
        RenderPipelineConfig::default(),
        Arc::new(RenderCache::new(&CacheConfig::default())),
    );
    service
        .render(&IdentityKey::new("link-policy"), source)
        .expect("document renders")
}

fn find<'a>(node: &'a RenderedNode, tag: &str, found: &mut Vec<&'a RenderedNode>) {
    if node.tag() == Some(tag) {
        found.push(node);
    }
    for child in node.children() {
        find(child, tag, found);
    }
}

fn elements<'a>(node: &'a RenderedNode, tag: &str) -> Vec<&'a RenderedNode> {
    let mut found = Vec::new();
    find(node, tag, &mut found);
    found
}

#[test]
fn javascript_links_lose_their_target() {
    let document = render("[click](javascript:alert(1))");
    assert_eq!(
        document.to_html(),
        format!("<p><a rel=\"{UGC_REL}\">click</a></p>")
    );
}

#[test]
fn https_links_keep_their_target() {
    let document = render("[site](https://example.com)");
    assert_eq!(
        document.to_html(),
        format!("<p><a href=\"https://example.com\" rel=\"{UGC_REL}\">site</a></p>")
    );
}

#[test]
fn obscured_schemes_are_stripped() {
    let sources = [
        "[a](JavaScript:alert(1))",
        "[a](vbscript:msgbox)",
        "[a](data:text/html,hi)",
        "[a](//evil.example)",
        "[a](ftp://files.example)",
    ];

    for source in sources {
        let document = render(source);
        let links = elements(&document, "a");
        assert_eq!(links.len(), 1, "{source}");
        assert_eq!(links[0].attribute("href"), None, "{source}");
        assert_eq!(links[0].attribute("rel"), Some(UGC_REL), "{source}");
    }
}

#[test]
fn control_characters_do_not_disguise_scheme_relative_links() {
    let sources = [
        "[a](/&#9;/evil.example)",
        "[a](/&#10;/evil.example)",
        "[a](/&#13;/evil.example)",
        "[a](</\t/evil.example>)",
        "[a](/&#9;\\evil.example)",
    ];

    for source in sources {
        let document = render(source);
        let links = elements(&document, "a");
        assert_eq!(links.len(), 1, "{source}");
        assert_eq!(links[0].attribute("href"), None, "{source}");
        assert_eq!(links[0].attribute("rel"), Some(UGC_REL), "{source}");
    }
}

#[test]
fn control_characters_do_not_disguise_off_site_images() {
    for source in [
        "![x](/&#10;/evil.example/t.png)",
        "![x](/&#9;/evil.example/t.png)",
        "![x](/&#13;/evil.example/t.png)",
    ] {
        let document = render(source);
        let images = elements(&document, "img");
        assert_eq!(images.len(), 1, "{source}");
        assert_eq!(images[0].attribute("src"), None, "{source}");
    }
}

#[test]
fn relative_fragment_and_mail_links_survive() {
    let document = render("[a](/posts/1) [b](#intro) [c](mailto:hi@example.com)");
    let hrefs: Vec<Option<&str>> = elements(&document, "a")
        .into_iter()
        .map(|link| link.attribute("href"))
        .collect();
    assert_eq!(
        hrefs,
        vec![Some("/posts/1"), Some("#intro"), Some("mailto:hi@example.com")]
    );
}

#[test]
fn reference_links_are_policed() {
    let document = render("[bad][x] and [good][y]\n\n[x]: javascript:void(0)\n[y]: https://ok.example\n");
    let links = elements(&document, "a");
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].attribute("href"), None);
    assert_eq!(links[1].attribute("href"), Some("https://ok.example"));
    assert!(links.iter().all(|link| link.attribute("rel") == Some(UGC_REL)));
}

#[test]
fn data_images_lose_their_source() {
    let document = render("![pixel](data:image/png;base64,AAAA)");
    let images = elements(&document, "img");
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].attribute("src"), None);
    assert_eq!(images[0].attribute("alt"), Some("pixel"));
}

#[test]
fn rooted_and_https_images_keep_their_source() {
    let document = render("![a](/static/a.png)\n\n![b](https://cdn.example/b.png)");
    let sources: Vec<Option<&str>> = elements(&document, "img")
        .into_iter()
        .map(|image| image.attribute("src"))
        .collect();
    assert_eq!(
        sources,
        vec![Some("/static/a.png"), Some("https://cdn.example/b.png")]
    );
}

#[test]
fn fragment_image_sources_are_stripped() {
    let document = render("![a](#not-an-image)");
    assert_eq!(elements(&document, "img")[0].attribute("src"), None);
}

#[test]
fn links_inside_components_are_policed() {
    let document = render(
        "<Callout type=\"note\">\n\nSee [this](javascript:alert(1)).\n\n</Callout>",
    );
    let links = elements(&document, "a");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].attribute("href"), None);
    assert_eq!(links[0].attribute("rel"), Some(UGC_REL));
}
