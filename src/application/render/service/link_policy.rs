//! Link and resource policy applied to the hypertext tree.
//!
//! Unsafe URLs are stripped rather than rejected: the element stays, its
//! target goes. Classification is an allow-list on the URL as a browser would
//! read it: control characters removed, surrounding spaces trimmed, lowercased.

use tracing::debug;

use super::config::UGC_LINK_REL;
use super::hast::{HastElement, HastNode, walk_elements_mut};

const LINK_PREFIXES: &[&str] = &["http://", "https://", "mailto:", "/", "#"];
const IMAGE_PREFIXES: &[&str] = &["http://", "https://", "/"];

/// Rewrites every `a` and `img` in place, including inside component children.
pub(crate) fn apply(nodes: &mut [HastNode]) {
    walk_elements_mut(nodes, &mut |element| match element.tag {
        "a" => police_link(element),
        "img" => police_image(element),
        _ => {}
    });
}

pub(crate) fn is_allowed_link(url: &str) -> bool {
    is_allowed(url, LINK_PREFIXES)
}

pub(crate) fn is_allowed_image_source(url: &str) -> bool {
    is_allowed(url, IMAGE_PREFIXES)
}

fn is_allowed(url: &str, prefixes: &[&str]) -> bool {
    let normalized = normalize(url);
    // `//host` and `/\host` resolve off-site in browsers.
    if normalized.starts_with("//") || normalized.starts_with("/\\") {
        return false;
    }
    prefixes
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
}

/// Browsers drop tab, LF and CR anywhere in a URL and trim C0 controls and
/// spaces at both ends; every ASCII control is removed here.
fn normalize(url: &str) -> String {
    url.chars()
        .filter(|ch| !ch.is_ascii_control())
        .collect::<String>()
        .trim_matches(' ')
        .to_ascii_lowercase()
}

fn police_link(element: &mut HastElement) {
    if element
        .attribute("href")
        .is_some_and(|href| !is_allowed_link(href))
    {
        let removed = element.remove_attribute("href").unwrap_or_default();
        debug!(
            target = "application::render::link_policy",
            tag = "a",
            url_len = removed.len(),
            "Stripped link target outside the allow-list"
        );
    }
    element.set_attribute("rel", UGC_LINK_REL);
}

fn police_image(element: &mut HastElement) {
    if element
        .attribute("src")
        .is_some_and(|src| !is_allowed_image_source(src))
    {
        let removed = element.remove_attribute("src").unwrap_or_default();
        debug!(
            target = "application::render::link_policy",
            tag = "img",
            url_len = removed.len(),
            "Stripped image source outside the allow-list"
        );
    }
}
