//! Closed syntax tree the guard and compiler operate on.
//!
//! Parser output is lowered into [`SyntaxNode`] before anything inspects it.
//! Parser node kinds without an explicit mapping become
//! [`SyntaxNode::Unsupported`], so a parser upgrade that introduces a new kind
//! is rejected until it is mapped here. Trees nested deeper than
//! [`MAX_NESTING_DEPTH`] are rejected before lowering; every later stage
//! recurses over the tree and relies on that bound.

use std::collections::HashMap;

use markdown::mdast::{AlignKind, AttributeContent, AttributeValue, Node};

use crate::domain::error::{UnsafeContentError, Violation};

/// Deepest parser node accepted, counting the root as depth 0.
pub(crate) const MAX_NESTING_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SyntaxNode {
    Root(Vec<SyntaxNode>),
    Paragraph(Vec<SyntaxNode>),
    Heading {
        depth: u8,
        children: Vec<SyntaxNode>,
    },
    Blockquote(Vec<SyntaxNode>),
    List {
        ordered: bool,
        start: Option<u32>,
        spread: bool,
        children: Vec<SyntaxNode>,
    },
    ListItem {
        checked: Option<bool>,
        spread: bool,
        children: Vec<SyntaxNode>,
    },
    Code {
        lang: Option<String>,
        value: String,
    },
    InlineCode(String),
    Text(String),
    Emphasis(Vec<SyntaxNode>),
    Strong(Vec<SyntaxNode>),
    Delete(Vec<SyntaxNode>),
    Break,
    ThematicBreak,
    Link {
        url: String,
        title: Option<String>,
        children: Vec<SyntaxNode>,
    },
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },
    Table {
        align: Vec<ColumnAlign>,
        children: Vec<SyntaxNode>,
    },
    TableRow(Vec<SyntaxNode>),
    TableCell(Vec<SyntaxNode>),
    FootnoteReference {
        identifier: String,
    },
    FootnoteDefinition {
        identifier: String,
        children: Vec<SyntaxNode>,
    },
    RawMarkup(String),
    ModuleDeclaration(String),
    FlowExpression(String),
    TextExpression(String),
    Element(CustomElement),
    Unsupported {
        kind: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnAlign {
    Left,
    Right,
    Center,
    None,
}

impl ColumnAlign {
    pub(crate) fn as_attribute(self) -> Option<&'static str> {
        match self {
            ColumnAlign::Left => Some("left"),
            ColumnAlign::Right => Some("right"),
            ColumnAlign::Center => Some("center"),
            ColumnAlign::None => None,
        }
    }
}

/// A JSX-like tag in the source. `name` is `None` for fragments (`<>...</>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CustomElement {
    pub name: Option<String>,
    pub attributes: Vec<ElementAttribute>,
    pub children: Vec<SyntaxNode>,
    pub inline: bool,
}

/// Attribute shapes as written. Only `Literal` is ever accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ElementAttribute {
    Literal { name: String, value: String },
    Bare { name: String },
    Expression { name: String },
    Spread,
}

struct Definition {
    url: String,
    title: Option<String>,
}

/// Lowers parser output. Reference-style links and images are resolved to their
/// definitions here so later stages see the real URL.
pub(crate) fn lower(root: &Node) -> Result<SyntaxNode, UnsafeContentError> {
    let mut definitions = HashMap::new();
    collect_definitions(root, 0, &mut definitions)?;
    let lowering = Lowering { definitions };
    Ok(lowering
        .node(root)
        .unwrap_or_else(|| SyntaxNode::Root(Vec::new())))
}

/// Gathers link definitions and enforces the depth bound in the same pass.
/// Recursion stops one level past the limit.
fn collect_definitions(
    node: &Node,
    depth: usize,
    definitions: &mut HashMap<String, Definition>,
) -> Result<(), UnsafeContentError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(Violation::NestingTooDeep {
            limit: MAX_NESTING_DEPTH,
        }
        .into());
    }
    if let Node::Definition(definition) = node {
        definitions
            .entry(normalize_identifier(&definition.identifier))
            .or_insert_with(|| Definition {
                url: definition.url.clone(),
                title: definition.title.clone(),
            });
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_definitions(child, depth + 1, definitions)?;
        }
    }
    Ok(())
}

fn normalize_identifier(identifier: &str) -> String {
    identifier
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

struct Lowering {
    definitions: HashMap<String, Definition>,
}

impl Lowering {
    fn children(&self, nodes: &[Node]) -> Vec<SyntaxNode> {
        nodes.iter().filter_map(|node| self.node(node)).collect()
    }

    fn resolve(&self, identifier: &str) -> Option<&Definition> {
        self.definitions.get(&normalize_identifier(identifier))
    }

    fn node(&self, node: &Node) -> Option<SyntaxNode> {
        let lowered = match node {
            Node::Root(root) => SyntaxNode::Root(self.children(&root.children)),
            Node::Paragraph(paragraph) => SyntaxNode::Paragraph(self.children(&paragraph.children)),
            Node::Heading(heading) => SyntaxNode::Heading {
                depth: heading.depth,
                children: self.children(&heading.children),
            },
            Node::Blockquote(quote) => SyntaxNode::Blockquote(self.children(&quote.children)),
            Node::List(list) => SyntaxNode::List {
                ordered: list.ordered,
                start: list.start,
                spread: list.spread,
                children: self.children(&list.children),
            },
            Node::ListItem(item) => SyntaxNode::ListItem {
                checked: item.checked,
                spread: item.spread,
                children: self.children(&item.children),
            },
            Node::Code(code) => SyntaxNode::Code {
                lang: code.lang.clone(),
                value: code.value.clone(),
            },
            Node::InlineCode(code) => SyntaxNode::InlineCode(code.value.clone()),
            Node::Text(text) => SyntaxNode::Text(text.value.clone()),
            Node::Emphasis(emphasis) => SyntaxNode::Emphasis(self.children(&emphasis.children)),
            Node::Strong(strong) => SyntaxNode::Strong(self.children(&strong.children)),
            Node::Delete(delete) => SyntaxNode::Delete(self.children(&delete.children)),
            Node::Break(_) => SyntaxNode::Break,
            Node::ThematicBreak(_) => SyntaxNode::ThematicBreak,
            Node::Link(link) => SyntaxNode::Link {
                url: link.url.clone(),
                title: link.title.clone(),
                children: self.children(&link.children),
            },
            Node::LinkReference(reference) => {
                let (url, title) = match self.resolve(&reference.identifier) {
                    Some(definition) => (definition.url.clone(), definition.title.clone()),
                    None => (String::new(), None),
                };
                SyntaxNode::Link {
                    url,
                    title,
                    children: self.children(&reference.children),
                }
            }
            Node::Image(image) => SyntaxNode::Image {
                url: image.url.clone(),
                alt: image.alt.clone(),
                title: image.title.clone(),
            },
            Node::ImageReference(reference) => {
                let (url, title) = match self.resolve(&reference.identifier) {
                    Some(definition) => (definition.url.clone(), definition.title.clone()),
                    None => (String::new(), None),
                };
                SyntaxNode::Image {
                    url,
                    alt: reference.alt.clone(),
                    title,
                }
            }
            Node::Definition(_) => return None,
            Node::Table(table) => SyntaxNode::Table {
                align: table.align.iter().map(column_align).collect(),
                children: self.children(&table.children),
            },
            Node::TableRow(row) => SyntaxNode::TableRow(self.children(&row.children)),
            Node::TableCell(cell) => SyntaxNode::TableCell(self.children(&cell.children)),
            Node::FootnoteReference(reference) => SyntaxNode::FootnoteReference {
                identifier: normalize_identifier(&reference.identifier),
            },
            Node::FootnoteDefinition(definition) => SyntaxNode::FootnoteDefinition {
                identifier: normalize_identifier(&definition.identifier),
                children: self.children(&definition.children),
            },
            Node::Html(html) => SyntaxNode::RawMarkup(html.value.clone()),
            Node::MdxjsEsm(esm) => SyntaxNode::ModuleDeclaration(esm.value.clone()),
            Node::MdxFlowExpression(expression) => {
                SyntaxNode::FlowExpression(expression.value.clone())
            }
            Node::MdxTextExpression(expression) => {
                SyntaxNode::TextExpression(expression.value.clone())
            }
            Node::MdxJsxFlowElement(element) => SyntaxNode::Element(CustomElement {
                name: element.name.clone(),
                attributes: element.attributes.iter().map(element_attribute).collect(),
                children: self.children(&element.children),
                inline: false,
            }),
            Node::MdxJsxTextElement(element) => SyntaxNode::Element(CustomElement {
                name: element.name.clone(),
                attributes: element.attributes.iter().map(element_attribute).collect(),
                children: self.children(&element.children),
                inline: true,
            }),
            other => SyntaxNode::Unsupported {
                kind: node_kind(other),
            },
        };
        Some(lowered)
    }
}

fn element_attribute(attribute: &AttributeContent) -> ElementAttribute {
    match attribute {
        AttributeContent::Expression { .. } => ElementAttribute::Spread,
        AttributeContent::Property(property) => {
            let name = property.name.clone();
            match &property.value {
                Some(AttributeValue::Literal(value)) => ElementAttribute::Literal {
                    name,
                    value: value.clone(),
                },
                Some(AttributeValue::Expression { .. }) => ElementAttribute::Expression { name },
                None => ElementAttribute::Bare { name },
            }
        }
    }
}

fn column_align(align: &AlignKind) -> ColumnAlign {
    match align {
        AlignKind::Left => ColumnAlign::Left,
        AlignKind::Right => ColumnAlign::Right,
        AlignKind::Center => ColumnAlign::Center,
        AlignKind::None => ColumnAlign::None,
    }
}

fn node_kind(node: &Node) -> String {
    let debug = format!("{node:?}");
    debug
        .split(|ch: char| ch == '(' || ch.is_whitespace())
        .next()
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use markdown::ParseOptions;

    use super::*;
    use crate::application::render::service::config::parse_options;
    use crate::application::render::service::guard::check;

    fn lower_source(source: &str) -> SyntaxNode {
        let tree = markdown::to_mdast(source, &parse_options()).expect("source should parse");
        lower(&tree).expect("source should lower")
    }

    fn root_children(node: SyntaxNode) -> Vec<SyntaxNode> {
        match node {
            SyntaxNode::Root(children) => children,
            other => panic!("expected root, got {other:?}"),
        }
    }

    #[test]
    fn resolves_reference_links_to_definitions() {
        let children = root_children(lower_source(
            "[site][home]\n\n[home]: https://example.com \"Home\"\n",
        ));

        assert_eq!(children.len(), 1, "definition must not survive lowering");
        let SyntaxNode::Paragraph(inline) = &children[0] else {
            panic!("expected paragraph");
        };
        match &inline[0] {
            SyntaxNode::Link { url, title, .. } => {
                assert_eq!(url, "https://example.com");
                assert_eq!(title.as_deref(), Some("Home"));
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn lowers_component_attribute_shapes() {
        let children = root_children(lower_source(
            "<Callout type=\"note\" title={1} open {...rest}>\nbody\n</Callout>\n",
        ));

        let SyntaxNode::Element(element) = &children[0] else {
            panic!("expected element, got {:?}", children[0]);
        };
        assert_eq!(element.name.as_deref(), Some("Callout"));
        assert!(!element.inline);
        assert_eq!(
            element.attributes,
            vec![
                ElementAttribute::Literal {
                    name: "type".to_string(),
                    value: "note".to_string(),
                },
                ElementAttribute::Expression {
                    name: "title".to_string(),
                },
                ElementAttribute::Bare {
                    name: "open".to_string(),
                },
                ElementAttribute::Spread,
            ]
        );
    }

    #[test]
    fn lowers_mdx_specific_nodes() {
        let children = root_children(lower_source("import x from 'y'\n\n{1 + 1}\n"));

        assert!(matches!(children[0], SyntaxNode::ModuleDeclaration(_)));
        assert!(matches!(children[1], SyntaxNode::FlowExpression(_)));
    }

    #[test]
    fn rejects_trees_deeper_than_the_limit() {
        let source = format!("{}deep", "> ".repeat(MAX_NESTING_DEPTH + 10));
        let tree = markdown::to_mdast(&source, &parse_options()).expect("source should parse");

        let error = lower(&tree).expect_err("nesting must be bounded");
        assert_eq!(
            error.violation(),
            &Violation::NestingTooDeep {
                limit: MAX_NESTING_DEPTH
            }
        );
    }

    #[test]
    fn accepts_trees_within_the_limit() {
        // Root, blockquotes, paragraph and text stay under the limit.
        let source = format!("{}shallow", "> ".repeat(MAX_NESTING_DEPTH - 2));
        let tree = markdown::to_mdast(&source, &parse_options()).expect("source should parse");

        assert!(lower(&tree).is_ok());
    }

    #[test]
    fn html_nodes_lower_to_raw_markup_and_are_rejected() {
        let tree = markdown::to_mdast("<div onclick=\"x\">hi</div>\n", &ParseOptions::gfm())
            .expect("source should parse");
        let lowered = lower(&tree).expect("source should lower");

        let children = root_children(lowered.clone());
        assert!(matches!(children[0], SyntaxNode::RawMarkup(_)));

        let error = check(&lowered).expect_err("raw markup must be rejected");
        assert_eq!(error.violation(), &Violation::RawMarkup);
        assert_eq!(error.reason(), "raw HTML is not allowed");
    }

    #[test]
    fn normalizes_identifiers() {
        assert_eq!(normalize_identifier("  Foo   Bar "), "foo bar");
    }
}
