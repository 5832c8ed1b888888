//! Binds compiled component references to the built-in implementations.
//!
//! Instantiation only knows [`ComponentKind`]; a reference to any other name
//! is dropped even though the guard should already have rejected it.

use tracing::warn;

use crate::application::render::types::{Attribute, RenderedNode};
use crate::domain::components::ComponentKind;

use super::hast::{CompiledDocument, ComponentRef, HastNode};

const DEFAULT_DETAILS_SUMMARY: &str = "展开";
const DEFAULT_TAB_LABEL: &str = "Tab";

pub(crate) fn instantiate(document: &CompiledDocument) -> RenderedNode {
    RenderedNode::Fragment {
        children: instantiate_nodes(&document.nodes),
    }
}

fn instantiate_nodes(nodes: &[HastNode]) -> Vec<RenderedNode> {
    nodes.iter().filter_map(instantiate_node).collect()
}

fn instantiate_node(node: &HastNode) -> Option<RenderedNode> {
    match node {
        HastNode::Text(value) => Some(RenderedNode::text(value.clone())),
        HastNode::Element(element) => Some(RenderedNode::element(
            element.tag,
            element.attributes.clone(),
            instantiate_nodes(&element.children),
        )),
        HastNode::Component(component) => {
            let Some(kind) = component.kind() else {
                warn!(
                    target = "application::render::components",
                    component = %component.name,
                    "Dropped reference to a component outside the allow-list"
                );
                return None;
            };
            let children = instantiate_nodes(&component.children);
            Some(render_component(kind, &Props::new(kind, component), children))
        }
    }
}

/// Literal props filtered to what the component declares.
struct Props<'a> {
    values: Vec<(&'a str, &'a str)>,
}

impl<'a> Props<'a> {
    fn new(kind: ComponentKind, component: &'a ComponentRef) -> Self {
        let values = component
            .props
            .iter()
            .filter(|prop| kind.allows_attribute(&prop.name))
            .map(|prop| (prop.name.as_str(), prop.value.as_str()))
            .collect();
        Self { values }
    }

    /// Value with surrounding whitespace removed; blank counts as absent.
    fn get(&self, name: &str) -> Option<&'a str> {
        self.values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }
}

fn render_component(
    kind: ComponentKind,
    props: &Props<'_>,
    children: Vec<RenderedNode>,
) -> RenderedNode {
    match kind {
        ComponentKind::Callout => callout(props, children),
        ComponentKind::Details => details(props, children),
        ComponentKind::Figure => figure(props, children),
        ComponentKind::Tabs => tabs(children),
        ComponentKind::Tab => tab(props, children),
    }
}

fn data_role(role: &str) -> Attribute {
    Attribute::new("data-role", role)
}

fn callout(props: &Props<'_>, children: Vec<RenderedNode>) -> RenderedNode {
    let tone = callout_tone(props.get("type").unwrap_or("note"));
    let mut body = Vec::new();
    if let Some(title) = props.get("title") {
        body.push(RenderedNode::element(
            "p",
            vec![data_role("callout-title")],
            vec![RenderedNode::text(title)],
        ));
    }
    body.push(RenderedNode::element(
        "div",
        vec![data_role("callout-body")],
        children,
    ));

    RenderedNode::element(
        "aside",
        vec![
            data_role("callout"),
            Attribute::new("data-tone", tone),
            Attribute::new("role", "note"),
        ],
        body,
    )
}

fn callout_tone(kind: &str) -> &'static str {
    match kind.to_ascii_lowercase().as_str() {
        "warn" | "warning" => "warning",
        "danger" | "error" => "danger",
        _ => "note",
    }
}

fn details(props: &Props<'_>, children: Vec<RenderedNode>) -> RenderedNode {
    let summary = props.get("summary").unwrap_or(DEFAULT_DETAILS_SUMMARY);
    RenderedNode::element(
        "details",
        vec![data_role("details")],
        vec![
            RenderedNode::element("summary", Vec::new(), vec![RenderedNode::text(summary)]),
            RenderedNode::element("div", vec![data_role("details-body")], children),
        ],
    )
}

fn figure(props: &Props<'_>, children: Vec<RenderedNode>) -> RenderedNode {
    let mut body = vec![RenderedNode::element(
        "div",
        vec![data_role("figure-body")],
        children,
    )];
    if let Some(caption) = props.get("caption") {
        body.push(RenderedNode::element(
            "figcaption",
            Vec::new(),
            vec![RenderedNode::text(caption)],
        ));
    }
    RenderedNode::element("figure", vec![data_role("figure")], body)
}

fn tab(props: &Props<'_>, children: Vec<RenderedNode>) -> RenderedNode {
    tab_panel(props.get("label").unwrap_or(DEFAULT_TAB_LABEL), children)
}

fn tab_panel(label: &str, children: Vec<RenderedNode>) -> RenderedNode {
    RenderedNode::element(
        "section",
        vec![
            data_role("tab-panel"),
            Attribute::new("data-label", label),
            Attribute::new("role", "tabpanel"),
        ],
        children,
    )
}

/// Every element child becomes a panel; loose text between tabs is dropped.
/// All panels are emitted and all but the first are `hidden`.
fn tabs(children: Vec<RenderedNode>) -> RenderedNode {
    let mut panels: Vec<RenderedNode> = children
        .into_iter()
        .filter_map(|child| match child {
            RenderedNode::Element { .. } if child.attribute("data-role") == Some("tab-panel") => {
                Some(child)
            }
            RenderedNode::Element { .. } => Some(tab_panel(DEFAULT_TAB_LABEL, vec![child])),
            RenderedNode::Text { .. } | RenderedNode::Fragment { .. } => None,
        })
        .collect();

    let buttons = panels
        .iter()
        .enumerate()
        .map(|(index, panel)| {
            let label = panel.attribute("data-label").unwrap_or(DEFAULT_TAB_LABEL);
            RenderedNode::element(
                "button",
                vec![
                    Attribute::new("type", "button"),
                    Attribute::new("role", "tab"),
                    Attribute::new("aria-selected", if index == 0 { "true" } else { "false" }),
                ],
                vec![RenderedNode::text(label)],
            )
        })
        .collect();

    for panel in panels.iter_mut().skip(1) {
        if let RenderedNode::Element { attributes, .. } = panel {
            attributes.push(Attribute::new("hidden", ""));
        }
    }

    let mut body = vec![RenderedNode::element(
        "div",
        vec![Attribute::new("role", "tablist")],
        buttons,
    )];
    body.extend(panels);
    RenderedNode::element("div", vec![data_role("tabs")], body)
}
