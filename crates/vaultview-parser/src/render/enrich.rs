//! HTML-tree enrichment: heading anchors and copy-to-clipboard buttons.

use super::html::{Element, HtmlNode};
use crate::slugger::Slugger;

fn is_heading(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Give each heading a unique `id` and wrap its content in a self-link.
///
/// Headings that already carry an `id` keep it.
pub fn add_heading_anchors(nodes: &mut [HtmlNode], slugger: &mut Slugger) {
    for node in nodes.iter_mut() {
        let Some(el) = node.as_element_mut() else {
            continue;
        };

        if !is_heading(el.tag) {
            add_heading_anchors(&mut el.children, slugger);
            continue;
        }

        let id = match el.get_attr("id") {
            Some(id) => id.to_string(),
            None => {
                let id = slugger.slug(&el.text_content());
                el.set_attr("id", id.clone());
                id
            }
        };

        let content = std::mem::take(&mut el.children);
        el.children = vec![
            Element::new("a")
                .attr("href", format!("#{}", id))
                .with_children(content)
                .into(),
        ];
    }
}

/// Wrap each `pre` holding a `code` element with a copy button carrying the
/// code's plain text.
pub fn add_copy_buttons(nodes: &mut [HtmlNode]) {
    for node in nodes.iter_mut() {
        let Some(el) = node.as_element_mut() else {
            continue;
        };

        if el.tag != "pre" {
            add_copy_buttons(&mut el.children);
            continue;
        }

        let Some(code) = el
            .children
            .iter()
            .filter_map(HtmlNode::as_element)
            .find(|child| child.tag == "code")
        else {
            continue;
        };

        let button = Element::new("button")
            .attr("class", "copy-code-btn")
            .attr("data-code", code.text_content())
            .attr("aria-label", "Copy code to clipboard")
            .attr("title", "Copy code")
            .child(Element::new("span").attr("class", "copy-icon").child("📋"));

        let pre = std::mem::replace(node, HtmlNode::Text(String::new()));
        *node = Element::new("div")
            .attr("class", "code-block-wrapper")
            .child(button)
            .child(pre)
            .into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::html::to_html;

    fn heading(tag: &'static str, text: &'static str) -> HtmlNode {
        Element::new(tag).child(text).into()
    }

    #[test]
    fn test_heading_anchors_unique() {
        let mut nodes = vec![heading("h2", "Intro"), heading("h3", "Intro")];
        add_heading_anchors(&mut nodes, &mut Slugger::new());
        assert_eq!(
            to_html(&nodes),
            "<h2 id=\"intro\"><a href=\"#intro\">Intro</a></h2>\
             <h3 id=\"intro-1\"><a href=\"#intro-1\">Intro</a></h3>"
        );
    }

    #[test]
    fn test_existing_id_kept() {
        let mut nodes: Vec<HtmlNode> =
            vec![Element::new("h1").attr("id", "custom").child("Title").into()];
        add_heading_anchors(&mut nodes, &mut Slugger::new());
        assert_eq!(
            to_html(&nodes),
            "<h1 id=\"custom\"><a href=\"#custom\">Title</a></h1>"
        );
    }

    #[test]
    fn test_copy_button_wraps_pre() {
        let mut nodes: Vec<HtmlNode> = vec![
            Element::new("pre")
                .child(Element::new("code").child(HtmlNode::text("echo \"hi\"\n")))
                .into(),
        ];
        add_copy_buttons(&mut nodes);
        assert_eq!(
            to_html(&nodes),
            "<div class=\"code-block-wrapper\">\
             <button class=\"copy-code-btn\" data-code=\"echo &quot;hi&quot;\n\" \
             aria-label=\"Copy code to clipboard\" title=\"Copy code\">\
             <span class=\"copy-icon\">📋</span></button>\
             <pre><code>echo \"hi\"\n</code></pre></div>"
        );
    }

    #[test]
    fn test_pre_without_code_not_wrapped() {
        let original: Vec<HtmlNode> = vec![Element::new("pre").child("diagram").into()];
        let mut nodes = original.clone();
        add_copy_buttons(&mut nodes);
        assert_eq!(nodes, original);
    }

    #[test]
    fn test_copy_button_uses_highlighted_text() {
        let mut nodes: Vec<HtmlNode> = vec![
            Element::new("pre")
                .child(Element::new("code").child(HtmlNode::Highlighted {
                    html: "<span class=\"hl-k\">let</span>".to_string(),
                    text: "let".to_string(),
                }))
                .into(),
        ];
        add_copy_buttons(&mut nodes);
        assert!(to_html(&nodes).contains("data-code=\"let\""));
    }
}
