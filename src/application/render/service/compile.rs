use std::collections::HashMap;

use crate::application::render::types::Attribute;

use super::hast::{ComponentRef, HastElement, HastNode};
use super::syntax::{ColumnAlign, CustomElement, ElementAttribute, SyntaxNode};

/// Builds the hypertext tree for a guarded syntax tree.
///
/// Footnote definitions are gathered and emitted as a trailing section in
/// order of first reference; unreferenced definitions are dropped.
pub(crate) fn compile(root: &SyntaxNode) -> Vec<HastNode> {
    let mut compiler = Compiler::default();
    let mut nodes = compiler.node(root);
    if let Some(section) = compiler.footnote_section() {
        nodes.push(section);
    }
    nodes
}

#[derive(Default)]
struct Compiler {
    footnote_order: Vec<String>,
    footnote_refs: HashMap<String, usize>,
    footnote_definitions: HashMap<String, Vec<HastNode>>,
}

impl Compiler {
    fn nodes(&mut self, children: &[SyntaxNode]) -> Vec<HastNode> {
        children.iter().flat_map(|child| self.node(child)).collect()
    }

    fn wrap(&mut self, tag: &'static str, children: &[SyntaxNode]) -> Vec<HastNode> {
        let children = self.nodes(children);
        vec![HastNode::element(HastElement::new(tag, children))]
    }

    fn node(&mut self, node: &SyntaxNode) -> Vec<HastNode> {
        match node {
            SyntaxNode::Root(children) => self.nodes(children),
            SyntaxNode::Paragraph(children) => {
                let children = self.nodes(children);
                vec![unwrap_lone_component(children)]
            }
            SyntaxNode::Heading { depth, children } => self.wrap(heading_tag(*depth), children),
            SyntaxNode::Blockquote(children) => self.wrap("blockquote", children),
            SyntaxNode::List {
                ordered,
                start,
                spread,
                children,
            } => {
                let items = children
                    .iter()
                    .flat_map(|item| self.list_item(item, *spread))
                    .collect();
                let mut list = HastElement::new(if *ordered { "ol" } else { "ul" }, items);
                if let Some(start) = start.filter(|start| *ordered && *start != 1) {
                    list.set_attribute("start", start.to_string());
                }
                vec![HastNode::element(list)]
            }
            SyntaxNode::ListItem { .. } => self.list_item(node, false),
            SyntaxNode::Code { lang, value } => {
                let mut code = HastElement::new("code", vec![HastNode::text(value.clone())]);
                if let Some(lang) = lang.as_deref().filter(|lang| !lang.is_empty()) {
                    code.set_attribute("class", format!("language-{lang}"));
                }
                vec![HastNode::element(HastElement::new(
                    "pre",
                    vec![HastNode::element(code)],
                ))]
            }
            SyntaxNode::InlineCode(value) => vec![HastNode::element(HastElement::new(
                "code",
                vec![HastNode::text(value.clone())],
            ))],
            SyntaxNode::Text(value) => vec![HastNode::text(value.clone())],
            SyntaxNode::Emphasis(children) => self.wrap("em", children),
            SyntaxNode::Strong(children) => self.wrap("strong", children),
            SyntaxNode::Delete(children) => self.wrap("del", children),
            SyntaxNode::Break => vec![HastNode::element(HastElement::new("br", Vec::new()))],
            SyntaxNode::ThematicBreak => {
                vec![HastNode::element(HastElement::new("hr", Vec::new()))]
            }
            SyntaxNode::Link {
                url,
                title,
                children,
            } => {
                let children = self.nodes(children);
                let mut link = HastElement::new("a", children).with_attribute("href", url.clone());
                if let Some(title) = title {
                    link.set_attribute("title", title.clone());
                }
                vec![HastNode::element(link)]
            }
            SyntaxNode::Image { url, alt, title } => {
                let mut image = HastElement::new("img", Vec::new())
                    .with_attribute("src", url.clone())
                    .with_attribute("alt", alt.clone());
                if let Some(title) = title {
                    image.set_attribute("title", title.clone());
                }
                vec![HastNode::element(image)]
            }
            SyntaxNode::Table { align, children } => vec![self.table(align, children)],
            SyntaxNode::TableRow(children) => self.wrap("tr", children),
            SyntaxNode::TableCell(children) => self.wrap("td", children),
            SyntaxNode::FootnoteReference { identifier } => vec![self.footnote_ref(identifier)],
            SyntaxNode::FootnoteDefinition {
                identifier,
                children,
            } => {
                let body = self.nodes(children);
                self.footnote_definitions
                    .entry(identifier.clone())
                    .or_insert(body);
                Vec::new()
            }
            SyntaxNode::Element(element) => vec![component(element, self.nodes(&element.children))],
            // Rejected by the guard before compilation.
            SyntaxNode::RawMarkup(_)
            | SyntaxNode::ModuleDeclaration(_)
            | SyntaxNode::FlowExpression(_)
            | SyntaxNode::TextExpression(_)
            | SyntaxNode::Unsupported { .. } => Vec::new(),
        }
    }

    fn list_item(&mut self, node: &SyntaxNode, list_spread: bool) -> Vec<HastNode> {
        let SyntaxNode::ListItem {
            checked,
            spread,
            children,
        } = node
        else {
            return self.node(node);
        };

        let tight = !list_spread && !*spread;
        let mut body = Vec::new();
        if let Some(checked) = checked {
            let mut checkbox = HastElement::new("input", Vec::new())
                .with_attribute("type", "checkbox")
                .with_attribute("disabled", "");
            if *checked {
                checkbox.set_attribute("checked", "");
            }
            body.push(HastNode::element(checkbox));
        }
        for child in children {
            match child {
                SyntaxNode::Paragraph(inline) if tight => body.extend(self.nodes(inline)),
                other => body.extend(self.node(other)),
            }
        }

        let mut item = HastElement::new("li", body);
        if checked.is_some() {
            item.set_attribute("class", "task-list-item");
        }
        vec![HastNode::element(item)]
    }

    fn table(&mut self, align: &[ColumnAlign], rows: &[SyntaxNode]) -> HastNode {
        let mut head = Vec::new();
        let mut body = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let SyntaxNode::TableRow(cells) = row else {
                continue;
            };
            let cell_tag = if index == 0 { "th" } else { "td" };
            let cells = cells
                .iter()
                .enumerate()
                .map(|(column, cell)| {
                    let children = match cell {
                        SyntaxNode::TableCell(children) => self.nodes(children),
                        other => self.node(other),
                    };
                    let mut element = HastElement::new(cell_tag, children);
                    if let Some(value) = align.get(column).and_then(|a| a.as_attribute()) {
                        element.set_attribute("align", value);
                    }
                    HastNode::element(element)
                })
                .collect();
            let row = HastNode::element(HastElement::new("tr", cells));
            if index == 0 {
                head.push(row);
            } else {
                body.push(row);
            }
        }

        let mut sections = vec![HastNode::element(HastElement::new("thead", head))];
        if !body.is_empty() {
            sections.push(HastNode::element(HastElement::new("tbody", body)));
        }
        HastNode::element(HastElement::new("table", sections))
    }

    fn footnote_ref(&mut self, identifier: &str) -> HastNode {
        let seen = self
            .footnote_refs
            .entry(identifier.to_string())
            .or_insert(0);
        *seen += 1;
        let occurrence = *seen;
        if occurrence == 1 {
            self.footnote_order.push(identifier.to_string());
        }
        let number = self
            .footnote_order
            .iter()
            .position(|existing| existing == identifier)
            .map_or(0, |position| position + 1);

        let ref_id = if occurrence == 1 {
            format!("fnref-{identifier}")
        } else {
            format!("fnref-{identifier}-{occurrence}")
        };
        let anchor = HastElement::new("a", vec![HastNode::text(number.to_string())])
            .with_attribute("href", format!("#fn-{identifier}"))
            .with_attribute("id", ref_id)
            .with_attribute("data-footnote-ref", "");
        HastNode::element(HastElement::new("sup", vec![HastNode::element(anchor)]))
    }

    fn footnote_section(&mut self) -> Option<HastNode> {
        let items: Vec<HastNode> = self
            .footnote_order
            .iter()
            .filter_map(|identifier| {
                let mut body = self.footnote_definitions.remove(identifier)?;
                let backref = HastNode::element(
                    HastElement::new("a", vec![HastNode::text("↩")])
                        .with_attribute("href", format!("#fnref-{identifier}"))
                        .with_attribute("data-footnote-backref", ""),
                );
                match body.last_mut() {
                    Some(HastNode::Element(last)) if last.tag == "p" => {
                        last.children.push(HastNode::text(" "));
                        last.children.push(backref);
                    }
                    _ => {
                        body.push(backref);
                    }
                }
                Some(HastNode::element(
                    HastElement::new("li", body).with_attribute("id", format!("fn-{identifier}")),
                ))
            })
            .collect();

        if items.is_empty() {
            return None;
        }
        Some(HastNode::element(
            HastElement::new(
                "section",
                vec![HastNode::element(HastElement::new("ol", items))],
            )
            .with_attribute("data-footnotes", "")
            .with_attribute("class", "footnotes"),
        ))
    }
}

fn heading_tag(depth: u8) -> &'static str {
    match depth {
        0 | 1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}

fn component(element: &CustomElement, children: Vec<HastNode>) -> HastNode {
    let props = element
        .attributes
        .iter()
        .filter_map(|attribute| match attribute {
            ElementAttribute::Literal { name, value } => {
                Some(Attribute::new(name.clone(), value.clone()))
            }
            _ => None,
        })
        .collect();

    HastNode::Component(ComponentRef {
        name: element.name.clone().unwrap_or_default(),
        props,
        children,
    })
}

/// `<Callout>..</Callout>` written on one line parses as inline content of a
/// paragraph; render it as a block instead of nesting it inside `<p>`.
fn unwrap_lone_component(children: Vec<HastNode>) -> HastNode {
    let mut significant = children.iter().filter(|child| !child.is_blank_text());
    let lone = matches!(
        (significant.next(), significant.next()),
        (Some(HastNode::Component(_)), None)
    );

    if lone {
        if let Some(component) = children
            .into_iter()
            .find(|child| matches!(child, HastNode::Component(_)))
        {
            return component;
        }
        return HastNode::element(HastElement::new("p", Vec::new()));
    }
    HastNode::element(HastElement::new("p", children))
}
