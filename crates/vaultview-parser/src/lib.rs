//! # vaultview parser
//!
//! Everything that turns note text into structure or HTML, with no
//! filesystem access:
//!
//! - [`frontmatter`] - split and parse the leading YAML block
//! - [`wikilinks`] - `[[Target#Heading|Alias]]` syntax and the [`LinkResolver`] seam
//! - [`slugger`] - GitHub-style heading anchors
//! - [`headings`] - table-of-contents extraction
//! - [`render`] - the markdown to HTML pipeline
//!
//! ## Quick Start
//!
//! ```
//! use vaultview_parser::prelude::*;
//!
//! let (yaml, body) = split_frontmatter("---\ntitle: Foo\n---\n# Heading\n");
//! let frontmatter = parse_frontmatter(yaml.unwrap()).unwrap();
//! assert_eq!(frontmatter["title"], "Foo");
//!
//! let headings = extract_headings(body);
//! assert_eq!(headings[0].slug, "heading");
//!
//! let html = render_markdown(body, &NoLinks).unwrap();
//! assert!(html.starts_with("<h1 id=\"heading\">"));
//! ```

pub mod frontmatter;
pub mod headings;
pub mod render;
pub mod slugger;
pub mod wikilinks;

pub use frontmatter::{frontmatter_title, parse_frontmatter, split_frontmatter};
pub use headings::extract_headings;
pub use render::render_markdown;
pub use slugger::{Slugger, slugify};
pub use wikilinks::{
    LinkResolver, NoLinks, Resolution, ResolutionTier, WikiLink, find_wikilinks,
};

pub mod prelude {
    pub use crate::frontmatter::{frontmatter_title, parse_frontmatter, split_frontmatter};
    pub use crate::headings::extract_headings;
    pub use crate::render::render_markdown;
    pub use crate::slugger::{Slugger, slugify};
    pub use crate::wikilinks::{LinkResolver, NoLinks, Resolution, ResolutionTier, WikiLink};
    pub use vaultview_core::prelude::*;
}
