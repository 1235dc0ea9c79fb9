//! Markdown to HTML.
//!
//! The pipeline is a fixed sequence of explicit stages over two trees:
//!
//! 1. parse (CommonMark + GFM) into a markdown tree ([`mdast`])
//! 2. wikilinks, bare URLs and diagram fences rewritten on that tree ([`transforms`])
//! 3. conversion to an HTML tree, raw HTML kept verbatim ([`html`])
//! 4. heading ids and self-links, syntax highlighting, copy buttons
//!    ([`enrich`], [`highlight`])
//! 5. serialization
//!
//! Stages are plain functions; there is no plugin registry.

pub mod enrich;
pub mod highlight;
pub mod html;
pub mod mdast;
pub mod transforms;

use crate::slugger::Slugger;
use crate::wikilinks::LinkResolver;
use vaultview_core::Result;

pub use html::{Element, HtmlNode};
pub use mdast::{Container, MdNode, parse_markdown};

/// Render a note body to HTML, resolving wikilinks with `resolver`.
///
/// # Example
///
/// ```
/// use vaultview_parser::{NoLinks, render_markdown};
///
/// let html = render_markdown("# Hi\n\nSee [[Missing]]", &NoLinks).unwrap();
/// assert!(html.contains("<h1 id=\"hi\"><a href=\"#hi\">Hi</a></h1>"));
/// assert!(html.contains("class=\"wikilink wikilink-broken\""));
/// ```
pub fn render_markdown(source: &str, resolver: &dyn LinkResolver) -> Result<String> {
    let mut tree = parse_markdown(source);

    transforms::resolve_wikilinks(&mut tree, resolver);
    transforms::link_bare_urls(&mut tree);
    transforms::transform_diagram_fences(&mut tree);

    let mut nodes = html::from_markdown(&tree);

    enrich::add_heading_anchors(&mut nodes, &mut Slugger::new());
    highlight::highlight_code_blocks(&mut nodes)?;
    enrich::add_copy_buttons(&mut nodes);

    Ok(html::to_html(&nodes))
}
