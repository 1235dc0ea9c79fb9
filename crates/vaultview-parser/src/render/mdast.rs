//! Markdown syntax tree and its builder.
//!
//! pulldown-cmark yields a flat event stream; transforms need a tree they
//! can rewrite in place, so events are folded into [`MdNode`]s here.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd};

/// Nodes that own children
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    Root,
    Paragraph,
    Heading(u8),
    BlockQuote,
    /// `start` is `Some` for ordered lists
    List { start: Option<u64> },
    Item,
    Table(Vec<Alignment>),
    /// Header row: holds cells directly
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    Link { url: String, title: String },
    Image { url: String, title: String },
    /// Link produced from `[[...]]`
    WikiLink { href: String, broken: bool },
    FootnoteDefinition(String),
    /// Constructs without their own markup; children render inline
    Transparent,
}

/// A markdown tree node
#[derive(Debug, Clone, PartialEq)]
pub enum MdNode {
    Container {
        kind: Container,
        children: Vec<MdNode>,
    },
    Text(String),
    InlineCode(String),
    /// Fenced or indented code block; `lang` is the first word of the info string.
    /// `value` has no trailing newline.
    Code {
        lang: Option<String>,
        value: String,
    },
    /// Raw HTML (block or inline), passed through unescaped
    Html(String),
    FootnoteReference(String),
    TaskMarker(bool),
    SoftBreak,
    HardBreak,
    Rule,
}

impl MdNode {
    pub fn container(kind: Container, children: Vec<MdNode>) -> Self {
        MdNode::Container { kind, children }
    }

    pub fn children(&self) -> Option<&[MdNode]> {
        match self {
            MdNode::Container { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<MdNode>> {
        match self {
            MdNode::Container { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<&Container> {
        match self {
            MdNode::Container { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Concatenated text content (alt text, heading text)
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            MdNode::Container { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            MdNode::Text(text) | MdNode::InlineCode(text) => out.push_str(text),
            MdNode::Code { value, .. } => out.push_str(value),
            MdNode::SoftBreak | MdNode::HardBreak => out.push(' '),
            _ => {}
        }
    }
}

/// CommonMark plus the GFM extensions notes are written with
pub fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

enum FrameKind {
    Node(Container),
    CodeBlock(Option<String>),
    HtmlBlock,
}

struct Frame {
    kind: FrameKind,
    children: Vec<MdNode>,
    /// Literal content of code and HTML blocks
    buffer: String,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            buffer: String::new(),
        }
    }

    fn collects_literal(&self) -> bool {
        matches!(self.kind, FrameKind::CodeBlock(_) | FrameKind::HtmlBlock)
    }

    fn into_node(self) -> MdNode {
        match self.kind {
            FrameKind::Node(kind) => MdNode::container(kind, self.children),
            FrameKind::CodeBlock(lang) => {
                let mut value = self.buffer;
                if value.ends_with('\n') {
                    value.pop();
                }
                MdNode::Code { lang, value }
            }
            FrameKind::HtmlBlock => MdNode::Html(self.buffer),
        }
    }
}

/// Builds an [`MdNode`] tree from pulldown-cmark events
struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame::new(FrameKind::Node(Container::Root))],
        }
    }

    fn top(&mut self) -> &mut Frame {
        // The root frame is never popped
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_child(&mut self, node: MdNode) {
        let top = self.top();
        // Text arrives split (pulldown breaks at `[`); merge so `[[x]]` stays whole
        if let (MdNode::Text(new), Some(MdNode::Text(prev))) = (&node, top.children.last_mut()) {
            prev.push_str(new);
            return;
        }
        top.children.push(node);
    }

    fn open(&mut self, kind: FrameKind) {
        self.stack.push(Frame::new(kind));
    }

    fn close(&mut self) {
        if self.stack.len() > 1
            && let Some(frame) = self.stack.pop()
        {
            let node = frame.into_node();
            self.top().children.push(node);
        }
    }

    fn text(&mut self, text: &str) {
        let top = self.top();
        if top.collects_literal() {
            top.buffer.push_str(text);
        } else {
            self.push_child(MdNode::Text(text.to_string()));
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_child(MdNode::InlineCode(code.to_string())),
            Event::InlineMath(math) | Event::DisplayMath(math) => self.text(&math),
            Event::Html(html) | Event::InlineHtml(html) => {
                let top = self.top();
                if top.collects_literal() {
                    top.buffer.push_str(&html);
                } else {
                    top.children.push(MdNode::Html(html.to_string()));
                }
            }
            Event::FootnoteReference(label) => {
                self.push_child(MdNode::FootnoteReference(label.to_string()))
            }
            Event::SoftBreak => {
                if self.top().collects_literal() {
                    self.top().buffer.push('\n');
                } else {
                    self.push_child(MdNode::SoftBreak);
                }
            }
            Event::HardBreak => self.push_child(MdNode::HardBreak),
            Event::Rule => self.push_child(MdNode::Rule),
            Event::TaskListMarker(checked) => self.push_child(MdNode::TaskMarker(checked)),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => FrameKind::Node(Container::Paragraph),
            Tag::Heading { level, .. } => FrameKind::Node(Container::Heading(level as u8)),
            Tag::BlockQuote(_) => FrameKind::Node(Container::BlockQuote),
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                let lang = info
                    .split_whitespace()
                    .next()
                    .filter(|l| !l.is_empty())
                    .map(str::to_string);
                FrameKind::CodeBlock(lang)
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => FrameKind::CodeBlock(None),
            Tag::HtmlBlock => FrameKind::HtmlBlock,
            Tag::List(start) => FrameKind::Node(Container::List { start }),
            Tag::Item => FrameKind::Node(Container::Item),
            Tag::FootnoteDefinition(label) => {
                FrameKind::Node(Container::FootnoteDefinition(label.to_string()))
            }
            Tag::Table(alignments) => FrameKind::Node(Container::Table(alignments)),
            Tag::TableHead => FrameKind::Node(Container::TableHead),
            Tag::TableRow => FrameKind::Node(Container::TableRow),
            Tag::TableCell => FrameKind::Node(Container::TableCell),
            Tag::Emphasis => FrameKind::Node(Container::Emphasis),
            Tag::Strong => FrameKind::Node(Container::Strong),
            Tag::Strikethrough => FrameKind::Node(Container::Strikethrough),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let url = if link_type == LinkType::Email {
                    format!("mailto:{}", dest_url)
                } else {
                    dest_url.to_string()
                };
                FrameKind::Node(Container::Link {
                    url,
                    title: title.to_string(),
                })
            }
            Tag::Image {
                dest_url, title, ..
            } => FrameKind::Node(Container::Image {
                url: dest_url.to_string(),
                title: title.to_string(),
            }),
            _ => FrameKind::Node(Container::Transparent),
        };
        self.open(kind);
    }

    fn end(&mut self, _tag: TagEnd) {
        // pulldown-cmark guarantees balanced start/end events
        self.close();
    }

    fn finish(mut self) -> MdNode {
        while self.stack.len() > 1 {
            self.close();
        }
        match self.stack.pop() {
            Some(root) => root.into_node(),
            None => MdNode::container(Container::Root, Vec::new()),
        }
    }
}

/// Parse markdown into a tree rooted at [`Container::Root`]
pub fn parse_markdown(source: &str) -> MdNode {
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(source, parser_options()) {
        builder.handle(event);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_children(source: &str) -> Vec<MdNode> {
        match parse_markdown(source) {
            MdNode::Container {
                kind: Container::Root,
                children,
            } => children,
            other => panic!("expected root, got {:?}", other),
        }
    }

    #[test]
    fn test_heading_and_paragraph() {
        let children = root_children("# Title\n\nHello *world*");
        assert_eq!(children[0].kind(), Some(&Container::Heading(1)));
        assert_eq!(children[0].plain_text(), "Title");
        assert_eq!(children[1].kind(), Some(&Container::Paragraph));
        assert_eq!(children[1].plain_text(), "Hello world");
    }

    #[test]
    fn test_wikilink_text_is_coalesced() {
        let children = root_children("See [[Foo|the foo]] now");
        let para = children[0].children().unwrap();
        assert_eq!(para.len(), 1);
        assert_eq!(para[0], MdNode::Text("See [[Foo|the foo]] now".to_string()));
    }

    #[test]
    fn test_fenced_code_language() {
        let children = root_children("```rust ignore\nfn main() {}\n```\n");
        assert_eq!(
            children[0],
            MdNode::Code {
                lang: Some("rust".to_string()),
                value: "fn main() {}".to_string()
            }
        );
    }

    #[test]
    fn test_indented_code_has_no_language() {
        let children = root_children("    plain code\n");
        assert!(matches!(&children[0], MdNode::Code { lang: None, .. }));
    }

    #[test]
    fn test_html_block_is_raw() {
        let children = root_children("<div class=\"x\">\nhi\n</div>\n");
        assert!(matches!(&children[0], MdNode::Html(html) if html.contains("<div class=\"x\">")));
    }

    #[test]
    fn test_task_list_markers() {
        let children = root_children("- [x] done\n- [ ] todo\n");
        let items = children[0].children().unwrap();
        assert_eq!(items[0].children().unwrap()[0], MdNode::TaskMarker(true));
        assert_eq!(items[1].children().unwrap()[0], MdNode::TaskMarker(false));
    }

    #[test]
    fn test_table_structure() {
        let children = root_children("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        match children[0].kind() {
            Some(Container::Table(alignments)) => {
                assert_eq!(alignments, &vec![Alignment::Left, Alignment::Right])
            }
            other => panic!("expected table, got {:?}", other),
        }
        let rows = children[0].children().unwrap();
        assert_eq!(rows[0].kind(), Some(&Container::TableHead));
        assert_eq!(rows[1].kind(), Some(&Container::TableRow));
    }

    #[test]
    fn test_email_autolink_gets_mailto() {
        let children = root_children("<me@example.com>");
        let para = children[0].children().unwrap();
        assert!(matches!(
            para[0].kind(),
            Some(Container::Link { url, .. }) if url == "mailto:me@example.com"
        ));
    }
}
