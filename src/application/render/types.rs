use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::IdentityKey;
use crate::domain::error::UnsafeContentError;

use super::html;

/// Message shown to readers when a document cannot be rendered. The detailed
/// error stays in server logs.
pub const PUBLIC_FALLBACK_MESSAGE: &str =
    "This document's rich content failed to render safely, showing a fallback.";

/// Name/value pair on a rendered element. Order is preserved as produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Final document tree handed to the page layer. Contains only plain
/// elements and text; every component has already been expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderedNode {
    Fragment {
        children: Vec<RenderedNode>,
    },
    Element {
        tag: String,
        attributes: Vec<Attribute>,
        children: Vec<RenderedNode>,
    },
    Text {
        value: String,
    },
}

impl RenderedNode {
    pub fn element(
        tag: impl Into<String>,
        attributes: Vec<Attribute>,
        children: Vec<RenderedNode>,
    ) -> Self {
        RenderedNode::Element {
            tag: tag.into(),
            attributes,
            children,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        RenderedNode::Text {
            value: value.into(),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            RenderedNode::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            RenderedNode::Element { attributes, .. } => attributes
                .iter()
                .find(|attribute| attribute.name == name)
                .map(|attribute| attribute.value.as_str()),
            _ => None,
        }
    }

    pub fn children(&self) -> &[RenderedNode] {
        match self {
            RenderedNode::Fragment { children } | RenderedNode::Element { children, .. } => {
                children
            }
            RenderedNode::Text { .. } => &[],
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut buffer = String::new();
        collect_text(self, &mut buffer);
        buffer
    }

    /// Serialises the tree to an HTML fragment. Text and attribute values are escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        html::write_node(self, &mut out);
        out
    }
}

fn collect_text(node: &RenderedNode, buffer: &mut String) {
    match node {
        RenderedNode::Text { value } => buffer.push_str(value),
        RenderedNode::Fragment { children } | RenderedNode::Element { children, .. } => {
            for child in children {
                collect_text(child, buffer);
            }
        }
    }
}

/// Errors surfaced by the MDX pipeline. Callers log the detail and show
/// [`MdxError::public_message`] to readers.
#[derive(Debug, Clone, Error)]
pub enum MdxError {
    #[error(transparent)]
    Unsafe(#[from] UnsafeContentError),
    #[error("mdx parsing failed: {message}")]
    Parse { message: String },
    #[error("source is {actual} bytes, limit is {limit}")]
    TooLarge { limit: usize, actual: usize },
    #[error("render task failed: {message}")]
    Task { message: String },
}

impl MdxError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn task(message: impl Into<String>) -> Self {
        Self::Task {
            message: message.into(),
        }
    }

    pub fn as_unsafe(&self) -> Option<&UnsafeContentError> {
        match self {
            MdxError::Unsafe(error) => Some(error),
            _ => None,
        }
    }

    pub fn public_message(&self) -> &'static str {
        PUBLIC_FALLBACK_MESSAGE
    }
}

/// Contract of the MDX pipeline. Implementations bind components only to the
/// built-in allow-list; nothing here accepts caller-supplied components.
pub trait MdxPipeline: Send + Sync {
    /// Runs every guard stage and discards the result. The cache is not touched.
    fn validate(&self, source: &str) -> Result<(), MdxError>;

    /// Renders `source`, reusing the compiled document stored under `key` when present.
    fn render(&self, key: &IdentityKey, source: &str) -> Result<RenderedNode, MdxError>;
}
