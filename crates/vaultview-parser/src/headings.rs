//! Table-of-contents extraction.
//!
//! Headings are read from the parsed tree (so `#` lines inside code blocks
//! are ignored) and slugged exactly as the renderer slugs them, so every
//! entry's anchor exists in the rendered page.

use crate::render::mdast::{Container, MdNode, parse_markdown};
use crate::slugger::Slugger;
use crate::wikilinks::replace_with_display_text;
use vaultview_core::Heading;

/// Headings of a note body in document order
pub fn extract_headings(content: &str) -> Vec<Heading> {
    let tree = parse_markdown(content);
    let mut slugger = Slugger::new();
    let mut headings = Vec::new();
    collect(&tree, &mut slugger, &mut headings);
    headings
}

fn collect(node: &MdNode, slugger: &mut Slugger, out: &mut Vec<Heading>) {
    let MdNode::Container { kind, children } = node else {
        return;
    };

    if let Container::Heading(depth) = kind {
        let text = replace_with_display_text(&node.plain_text())
            .trim()
            .to_string();
        if !text.is_empty() {
            out.push(Heading {
                depth: *depth,
                slug: slugger.slug(&text),
                text,
            });
        }
        return;
    }

    for child in children {
        collect(child, slugger, out);
    }
}
