//! HTML tree: conversion from the markdown tree and serialization.

use super::mdast::{Container, MdNode};
use crate::slugger::slugify;
use pulldown_cmark::Alignment;

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

/// Attributes serialized by name alone when their value is empty
const BOOLEAN_ATTRIBUTES: &[&str] = &["checked", "disabled"];

/// An HTML node
#[derive(Debug, Clone, PartialEq)]
pub enum HtmlNode {
    Element(Element),
    /// Text; escaped on output
    Text(String),
    /// Trusted markup emitted verbatim (raw HTML from the note, diagram hooks)
    Raw(String),
    /// Highlighter output plus the plain text it was produced from
    Highlighted { html: String, text: String },
}

impl HtmlNode {
    pub fn text(text: impl Into<String>) -> Self {
        HtmlNode::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            HtmlNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            HtmlNode::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Visible text, as a browser's `textContent` would report it
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            HtmlNode::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
            HtmlNode::Text(text) => out.push_str(text),
            HtmlNode::Highlighted { text, .. } => out.push_str(text),
            HtmlNode::Raw(_) => {}
        }
    }
}

impl From<Element> for HtmlNode {
    fn from(el: Element) -> Self {
        HtmlNode::Element(el)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<HtmlNode>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn child(mut self, node: impl Into<HtmlNode>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn with_children(mut self, children: Vec<HtmlNode>) -> Self {
        self.children = children;
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let classes = match self.get_attr("class") {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.set_attr("class", classes);
    }

    /// First class with the given prefix, prefix removed (`language-rust` -> `rust`)
    pub fn class_with_prefix(&self, prefix: &str) -> Option<&str> {
        self.get_attr("class")?
            .split_whitespace()
            .find_map(|c| c.strip_prefix(prefix))
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(HtmlNode::text_content).collect()
    }
}

impl From<&'static str> for HtmlNode {
    fn from(text: &'static str) -> Self {
        HtmlNode::Text(text.to_string())
    }
}

/// Escape text content
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Markdown tree -> HTML tree
// ============================================================================

/// Convert a markdown tree to HTML nodes
pub fn from_markdown(root: &MdNode) -> Vec<HtmlNode> {
    let mut out = Vec::new();
    match root {
        MdNode::Container {
            kind: Container::Root,
            children,
        } => convert_blocks(children, &mut out),
        other => convert(other, &mut out),
    }
    out
}

fn is_block(node: &MdNode) -> bool {
    match node {
        MdNode::Container { kind, .. } => matches!(
            kind,
            Container::Paragraph
                | Container::Heading(_)
                | Container::BlockQuote
                | Container::List { .. }
                | Container::Item
                | Container::Table(_)
                | Container::FootnoteDefinition(_)
        ),
        MdNode::Code { .. } | MdNode::Rule => true,
        _ => false,
    }
}

/// Convert siblings, separating block-level ones with newlines
fn convert_blocks(children: &[MdNode], out: &mut Vec<HtmlNode>) {
    for (i, child) in children.iter().enumerate() {
        if i > 0 && is_block(child) {
            out.push(HtmlNode::text("\n"));
        }
        convert(child, out);
    }
}

fn convert_children(children: &[MdNode]) -> Vec<HtmlNode> {
    let mut out = Vec::new();
    convert_blocks(children, &mut out);
    out
}

fn has_task_marker(item: &MdNode) -> bool {
    item.children().is_some_and(|children| {
        children.iter().any(|c| match c {
            MdNode::TaskMarker(_) => true,
            MdNode::Container {
                kind: Container::Paragraph,
                children,
            } => matches!(children.first(), Some(MdNode::TaskMarker(_))),
            _ => false,
        })
    })
}

fn wrap_block(tag: &'static str, children: &[MdNode]) -> Element {
    let mut inner = vec![HtmlNode::text("\n")];
    convert_blocks(children, &mut inner);
    inner.push(HtmlNode::text("\n"));
    Element::new(tag).with_children(inner)
}

fn convert(node: &MdNode, out: &mut Vec<HtmlNode>) {
    match node {
        MdNode::Container { kind, children } => convert_container(kind, children, out),
        MdNode::Text(text) => out.push(HtmlNode::Text(text.clone())),
        MdNode::InlineCode(code) => {
            out.push(Element::new("code").child(HtmlNode::Text(code.clone())).into())
        }
        MdNode::Code { lang, value } => {
            let mut code = Element::new("code");
            if let Some(lang) = lang {
                code.set_attr("class", format!("language-{}", lang));
            }
            let text = if value.is_empty() {
                String::new()
            } else {
                format!("{}\n", value)
            };
            out.push(Element::new("pre").child(code.child(HtmlNode::Text(text))).into());
        }
        MdNode::Html(html) => out.push(HtmlNode::Raw(html.clone())),
        MdNode::FootnoteReference(label) => {
            let id = slugify(label);
            let link = Element::new("a")
                .attr("href", format!("#fn-{}", id))
                .attr("id", format!("fnref-{}", id))
                .child(HtmlNode::Text(label.clone()));
            out.push(
                Element::new("sup")
                    .attr("class", "footnote-reference")
                    .child(link)
                    .into(),
            );
        }
        MdNode::TaskMarker(checked) => {
            let mut input = Element::new("input")
                .attr("type", "checkbox")
                .attr("disabled", "");
            if *checked {
                input.set_attr("checked", "");
            }
            out.push(input.into());
            out.push(HtmlNode::text(" "));
        }
        MdNode::SoftBreak => out.push(HtmlNode::text("\n")),
        MdNode::HardBreak => {
            out.push(Element::new("br").into());
            out.push(HtmlNode::text("\n"));
        }
        MdNode::Rule => out.push(Element::new("hr").into()),
    }
}

fn convert_container(kind: &Container, children: &[MdNode], out: &mut Vec<HtmlNode>) {
    let element = match kind {
        Container::Root | Container::Transparent => {
            convert_blocks(children, out);
            return;
        }
        Container::Paragraph => Element::new("p").with_children(convert_children(children)),
        Container::Heading(level) => {
            Element::new(heading_tag(*level)).with_children(convert_children(children))
        }
        Container::BlockQuote => wrap_block("blockquote", children),
        Container::List { start } => {
            let mut list = match start {
                Some(1) => Element::new("ol"),
                Some(n) => Element::new("ol").attr("start", n.to_string()),
                None => Element::new("ul"),
            };
            let mut items = vec![HtmlNode::text("\n")];
            let mut tasks = false;
            for child in children {
                let is_task = has_task_marker(child);
                tasks |= is_task;
                let mut converted = Vec::new();
                convert(child, &mut converted);
                for mut node in converted {
                    if is_task && let Some(li) = node.as_element_mut() {
                        li.add_class("task-list-item");
                    }
                    items.push(node);
                }
                items.push(HtmlNode::text("\n"));
            }
            if tasks {
                list.add_class("contains-task-list");
            }
            list.with_children(items)
        }
        Container::Item => Element::new("li").with_children(convert_children(children)),
        Container::Table(alignments) => convert_table(alignments, children),
        // Rows and cells are only reached through `convert_table`
        Container::TableHead | Container::TableRow => {
            Element::new("tr").with_children(convert_children(children))
        }
        Container::TableCell => Element::new("td").with_children(convert_children(children)),
        Container::Emphasis => Element::new("em").with_children(convert_children(children)),
        Container::Strong => Element::new("strong").with_children(convert_children(children)),
        Container::Strikethrough => Element::new("del").with_children(convert_children(children)),
        Container::Link { url, title } => {
            let mut a = Element::new("a").attr("href", url.clone());
            if !title.is_empty() {
                a.set_attr("title", title.clone());
            }
            a.with_children(convert_children(children))
        }
        Container::Image { url, title } => {
            let alt: String = children.iter().map(MdNode::plain_text).collect();
            let mut img = Element::new("img").attr("src", url.clone()).attr("alt", alt);
            if !title.is_empty() {
                img.set_attr("title", title.clone());
            }
            img
        }
        Container::WikiLink { href, broken } => {
            let class = if *broken {
                "wikilink wikilink-broken"
            } else {
                "wikilink"
            };
            Element::new("a")
                .attr("href", href.clone())
                .attr("class", class)
                .with_children(convert_children(children))
        }
        Container::FootnoteDefinition(label) => {
            let id = slugify(label);
            let mut inner = vec![
                Element::new("sup")
                    .attr("class", "footnote-definition-label")
                    .child(HtmlNode::Text(label.clone()))
                    .into(),
            ];
            convert_blocks(children, &mut inner);
            Element::new("div")
                .attr("class", "footnote-definition")
                .attr("id", format!("fn-{}", id))
                .with_children(inner)
        }
    };
    out.push(element.into());
}

fn convert_table(alignments: &[Alignment], rows: &[MdNode]) -> Element {
    let mut thead = None;
    let mut body_rows = Vec::new();

    for row in rows {
        let (cell_tag, is_head) = match row.kind() {
            Some(Container::TableHead) => ("th", true),
            _ => ("td", false),
        };
        let cells = row
            .children()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                let mut el = Element::new(cell_tag)
                    .with_children(convert_children(cell.children().unwrap_or_default()));
                if let Some(align) = alignments.get(col).and_then(|a| alignment_attr(*a)) {
                    el.set_attr("align", align);
                }
                HtmlNode::Element(el)
            })
            .collect();
        let tr = HtmlNode::Element(Element::new("tr").with_children(cells));
        if is_head {
            thead = Some(tr);
        } else {
            body_rows.push(tr);
            body_rows.push(HtmlNode::text("\n"));
        }
    }

    let mut table = Element::new("table").child(HtmlNode::text("\n"));
    if let Some(head) = thead {
        table = table.child(Element::new("thead").child(head)).child("\n");
    }
    if !body_rows.is_empty() {
        table = table.child(Element::new("tbody").with_children(body_rows));
        table = table.child("\n");
    }
    table
}

fn alignment_attr(alignment: Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
    }
}

fn heading_tag(level: u8) -> &'static str {
    match level {
        1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}

// ============================================================================
// Serialization
// ============================================================================

/// Serialize HTML nodes to a string
pub fn to_html(nodes: &[HtmlNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &HtmlNode, out: &mut String) {
    match node {
        HtmlNode::Text(text) => out.push_str(&escape_text(text)),
        HtmlNode::Raw(html) | HtmlNode::Highlighted { html, .. } => out.push_str(html),
        HtmlNode::Element(el) => {
            out.push('<');
            out.push_str(el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                if !(value.is_empty() && BOOLEAN_ATTRIBUTES.contains(name)) {
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.tag) {
                return;
            }
            for child in &el.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(el.tag);
            out.push('>');
        }
    }
}
