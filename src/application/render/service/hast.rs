//! Hypertext tree produced by the compiler. Component references stay
//! symbolic until instantiation so the cache holds allow-list-independent output.

use crate::application::render::types::Attribute;
use crate::domain::components::ComponentKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HastNode {
    Element(HastElement),
    Text(String),
    Component(ComponentRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HastElement {
    pub tag: &'static str,
    pub attributes: Vec<Attribute>,
    pub children: Vec<HastNode>,
}

impl HastElement {
    pub fn new(tag: &'static str, children: Vec<HastNode>) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
            children,
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }

    /// Replaces an existing value in place, otherwise appends.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|attribute| attribute.name == name)
        {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self
            .attributes
            .iter()
            .position(|attribute| attribute.name == name)?;
        Some(self.attributes.remove(index).value)
    }
}

/// Reference to an allow-listed component with its literal props.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ComponentRef {
    pub name: String,
    pub props: Vec<Attribute>,
    pub children: Vec<HastNode>,
}

impl ComponentRef {
    pub fn kind(&self) -> Option<ComponentKind> {
        ComponentKind::from_name(&self.name)
    }
}

impl HastNode {
    pub fn element(element: HastElement) -> Self {
        HastNode::Element(element)
    }

    pub fn text(value: impl Into<String>) -> Self {
        HastNode::Text(value.into())
    }

    pub fn is_blank_text(&self) -> bool {
        matches!(self, HastNode::Text(value) if value.trim().is_empty())
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<HastNode>> {
        match self {
            HastNode::Element(element) => Some(&mut element.children),
            HastNode::Component(component) => Some(&mut component.children),
            HastNode::Text(_) => None,
        }
    }
}

/// Visits every element in pre-order, descending into component children too.
pub(crate) fn walk_elements_mut<F>(nodes: &mut [HastNode], visit: &mut F)
where
    F: FnMut(&mut HastElement),
{
    for node in nodes {
        if let HastNode::Element(element) = node {
            visit(element);
        }
        if let Some(children) = node.children_mut() {
            walk_elements_mut(children, visit);
        }
    }
}

/// Output of a successful compile: validated, link-policed, components unresolved.
///
/// Immutable once built; the render cache shares it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledDocument {
    pub(crate) nodes: Vec<HastNode>,
}

impl CompiledDocument {
    pub(crate) fn new(nodes: Vec<HastNode>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of top-level blocks.
    pub fn block_count(&self) -> usize {
        self.nodes.len()
    }
}
