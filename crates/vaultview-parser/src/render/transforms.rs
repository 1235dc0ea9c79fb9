//! Markdown-tree transforms, applied in order before HTML conversion:
//! wikilinks, GFM autolink literals, then diagram fences.

use super::html::escape_text;
use super::mdast::{Container, MdNode};
use crate::wikilinks::{LinkResolver, Resolution, find_wikilinks};
use regex::Regex;
use std::sync::LazyLock;

/// Bare `https://` and `www.` URLs; trailing punctuation stays outside the link
static AUTOLINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:https?://|www\.)[^\s<]*[^\s<.,:;"')\]!?*_~]"#).unwrap()
});

/// Apply `f` to each text run that may gain links (not inside links or images)
fn rewrite_text(node: &mut MdNode, f: &mut dyn FnMut(&str) -> Option<Vec<MdNode>>) {
    let MdNode::Container { kind, children } = node else {
        return;
    };
    if matches!(
        kind,
        Container::Link { .. } | Container::Image { .. } | Container::WikiLink { .. }
    ) {
        return;
    }

    let mut rewritten = Vec::with_capacity(children.len());
    for mut child in children.drain(..) {
        if let MdNode::Text(text) = &child {
            if let Some(replacement) = f(text) {
                rewritten.extend(replacement);
                continue;
            }
        } else {
            rewrite_text(&mut child, f);
        }
        rewritten.push(child);
    }
    *children = rewritten;
}

/// Replace `[[...]]` in text with wikilink nodes.
///
/// Embeds (`![[...]]`) stay as literal text. Code spans and code blocks are
/// never touched since they are not text nodes.
pub fn resolve_wikilinks(root: &mut MdNode, resolver: &dyn LinkResolver) {
    rewrite_text(root, &mut |text| {
        let matches = find_wikilinks(text);
        if matches.is_empty() {
            return None;
        }

        let mut nodes = Vec::with_capacity(matches.len() * 2 + 1);
        let mut last = 0;
        for m in matches {
            if m.start > last {
                nodes.push(MdNode::Text(text[last..m.start].to_string()));
            }

            let resolution = if m.link.target.is_empty() {
                Resolution::Unresolved
            } else {
                resolver.resolve(&m.link.target)
            };
            match &resolution {
                Resolution::Resolved { slug, tier } => {
                    log::trace!("wikilink {:?} -> {} ({:?})", m.link.target, slug, tier)
                }
                Resolution::Unresolved => log::debug!("broken wikilink {:?}", m.link.target),
            }

            nodes.push(MdNode::container(
                Container::WikiLink {
                    href: m.link.href(&resolution),
                    broken: resolution.slug().is_none(),
                },
                vec![MdNode::Text(m.link.display_text())],
            ));
            last = m.end;
        }
        if last < text.len() {
            nodes.push(MdNode::Text(text[last..].to_string()));
        }
        Some(nodes)
    });
}

/// Turn bare URLs in text into links
pub fn link_bare_urls(root: &mut MdNode) {
    rewrite_text(root, &mut |text| {
        if !text.contains("http") && !text.contains("www.") {
            return None;
        }

        let mut nodes = Vec::new();
        let mut last = 0;
        for m in AUTOLINK_PATTERN.find_iter(text) {
            if m.start() > last {
                nodes.push(MdNode::Text(text[last..m.start()].to_string()));
            }
            let url = if m.as_str().starts_with("www.") {
                format!("http://{}", m.as_str())
            } else {
                m.as_str().to_string()
            };
            nodes.push(MdNode::container(
                Container::Link {
                    url,
                    title: String::new(),
                },
                vec![MdNode::Text(m.as_str().to_string())],
            ));
            last = m.end();
        }

        if nodes.is_empty() {
            return None;
        }
        if last < text.len() {
            nodes.push(MdNode::Text(text[last..].to_string()));
        }
        Some(nodes)
    });
}

/// Replace `mermaid` and `excalidraw` fences with the client-side hooks
/// that render them in the browser.
pub fn transform_diagram_fences(node: &mut MdNode) {
    if let MdNode::Code {
        lang: Some(lang),
        value,
    } = node
    {
        let replacement = match lang.as_str() {
            "mermaid" => Some(format!(
                "<pre class=\"mermaid\">{}</pre>",
                escape_text(value)
            )),
            "excalidraw" => Some(format!(
                "<div class=\"excalidraw-embed\" data-excalidraw=\"{}\"></div>",
                encode_uri_component(value)
            )),
            _ => None,
        };
        if let Some(html) = replacement {
            *node = MdNode::Html(html);
        }
        return;
    }

    if let Some(children) = node.children_mut() {
        for child in children {
            transform_diagram_fences(child);
        }
    }
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
