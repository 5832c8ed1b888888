//! Syntax guard: rejects a lowered tree that contains anything outside the
//! MDX allow-list. Runs before any output is built and never rewrites.

use crate::domain::components::ComponentKind;
use crate::domain::error::{UnsafeContentError, Violation};

use super::syntax::{CustomElement, ElementAttribute, SyntaxNode};

const ANONYMOUS_COMPONENT: &str = "(anonymous)";

/// Walks the whole tree in document order and returns the first violation.
pub(crate) fn check(node: &SyntaxNode) -> Result<(), UnsafeContentError> {
    match node {
        SyntaxNode::ModuleDeclaration(_) => Err(Violation::ModuleDeclaration.into()),
        SyntaxNode::FlowExpression(_) | SyntaxNode::TextExpression(_) => {
            Err(Violation::Expression.into())
        }
        SyntaxNode::RawMarkup(_) => Err(Violation::RawMarkup.into()),
        SyntaxNode::Unsupported { kind } => Err(Violation::UnsupportedNode {
            kind: kind.clone(),
        }
        .into()),
        SyntaxNode::Element(element) => check_element(element),
        SyntaxNode::Root(children)
        | SyntaxNode::Paragraph(children)
        | SyntaxNode::Blockquote(children)
        | SyntaxNode::Emphasis(children)
        | SyntaxNode::Strong(children)
        | SyntaxNode::Delete(children)
        | SyntaxNode::TableRow(children)
        | SyntaxNode::TableCell(children)
        | SyntaxNode::Heading { children, .. }
        | SyntaxNode::List { children, .. }
        | SyntaxNode::ListItem { children, .. }
        | SyntaxNode::Link { children, .. }
        | SyntaxNode::Table { children, .. }
        | SyntaxNode::FootnoteDefinition { children, .. } => check_all(children),
        SyntaxNode::Code { .. }
        | SyntaxNode::InlineCode(_)
        | SyntaxNode::Text(_)
        | SyntaxNode::Break
        | SyntaxNode::ThematicBreak
        | SyntaxNode::Image { .. }
        | SyntaxNode::FootnoteReference { .. } => Ok(()),
    }
}

fn check_all(children: &[SyntaxNode]) -> Result<(), UnsafeContentError> {
    children.iter().try_for_each(check)
}

fn check_element(element: &CustomElement) -> Result<(), UnsafeContentError> {
    let name = element.name.as_deref().unwrap_or(ANONYMOUS_COMPONENT);
    let Some(kind) = element.name.as_deref().and_then(ComponentKind::from_name) else {
        return Err(Violation::UnknownComponent {
            name: name.to_string(),
        }
        .into());
    };

    for attribute in &element.attributes {
        check_attribute(kind, attribute)?;
    }

    check_all(&element.children)
}

fn check_attribute(
    kind: ComponentKind,
    attribute: &ElementAttribute,
) -> Result<(), UnsafeContentError> {
    let name = match attribute {
        ElementAttribute::Spread => return Err(Violation::UnsupportedAttribute.into()),
        ElementAttribute::Literal { name, .. }
        | ElementAttribute::Bare { name }
        | ElementAttribute::Expression { name } => name,
    };

    if is_event_handler(name) {
        return Err(Violation::EventHandler {
            attribute: name.clone(),
        }
        .into());
    }
    if !kind.allows_attribute(name) {
        return Err(Violation::AttributeNotAllowed {
            attribute: name.clone(),
            component: kind.name().to_string(),
        }
        .into());
    }

    match attribute {
        ElementAttribute::Literal { .. } => Ok(()),
        ElementAttribute::Expression { name } => Err(Violation::AttributeExpression {
            attribute: name.clone(),
        }
        .into()),
        ElementAttribute::Bare { name } => Err(Violation::MissingAttributeValue {
            attribute: name.clone(),
        }
        .into()),
        ElementAttribute::Spread => Err(Violation::UnsupportedAttribute.into()),
    }
}

fn is_event_handler(name: &str) -> bool {
    name.get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}
