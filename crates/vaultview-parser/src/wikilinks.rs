//! Wikilink syntax: `[[Note]]`, `[[folder/Note|Alias]]`, `[[Note#Heading]]`
//!
//! This module only understands the syntax. Deciding which note a target
//! names is the job of a [`LinkResolver`]; the vault crate's link index is
//! the production implementation.

use crate::render::transforms::encode_uri_component;
use crate::slugger::slugify;
use regex::Regex;
use std::sync::LazyLock;

/// Matches `[[...]]` (no nested brackets inside)
pub static WIKILINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").unwrap());

/// URL prefix every note link points under
pub const NOTES_ROUTE: &str = "/notes/";

/// How a wikilink target was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// The whole target (lowercased) was a known key
    Exact,
    /// Matched on the target's base name with directories and `.md` dropped
    Basename,
}

/// Outcome of resolving a wikilink target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { slug: String, tier: ResolutionTier },
    Unresolved,
}

impl Resolution {
    pub fn slug(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { slug, .. } => Some(slug),
            Resolution::Unresolved => None,
        }
    }
}

/// Maps wikilink targets to canonical note slugs.
pub trait LinkResolver: Send + Sync {
    /// Resolve a bare target (no alias, no `#fragment`)
    fn resolve(&self, target: &str) -> Resolution;
}

/// Resolver that knows no notes; every wikilink renders broken
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLinks;

impl LinkResolver for NoLinks {
    fn resolve(&self, _target: &str) -> Resolution {
        Resolution::Unresolved
    }
}

/// The parts of one `[[...]]` body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    /// Target note, trimmed, without alias or fragment
    pub target: String,
    /// Heading fragment after `#`, if any
    pub fragment: Option<String>,
    /// Text after the first `|`, if any
    pub alias: Option<String>,
}

impl WikiLink {
    /// Split the text between `[[` and `]]` on the first `|` and then the first `#`
    pub fn parse(inner: &str) -> Self {
        let (link, alias) = match inner.split_once('|') {
            Some((link, alias)) => (link, Some(alias.trim().to_string())),
            None => (inner, None),
        };

        let (target, fragment) = match link.split_once('#') {
            Some((target, fragment)) => {
                let fragment = fragment.trim();
                (
                    target.trim(),
                    (!fragment.is_empty()).then(|| fragment.to_string()),
                )
            }
            None => (link.trim(), None),
        };

        Self {
            target: target.to_string(),
            fragment,
            alias: alias.filter(|a| !a.is_empty()),
        }
    }

    /// Text shown for the link: the alias, else the link as written
    pub fn display_text(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }
        match &self.fragment {
            Some(fragment) if self.target.is_empty() => format!("#{}", fragment),
            Some(fragment) => format!("{}#{}", self.target, fragment),
            None => self.target.clone(),
        }
    }

    /// `href` for this link given how its target resolved.
    ///
    /// Broken links point at the target as written so the viewer can show
    /// a "missing note" page for it. Path segments and the fragment are
    /// percent-encoded; `/` separators are kept.
    pub fn href(&self, resolution: &Resolution) -> String {
        let path = resolution.slug().unwrap_or(self.target.as_str());
        let base = format!("{}{}", NOTES_ROUTE, encode_path(path));
        match &self.fragment {
            Some(fragment) => format!("{}#{}", base, encode_uri_component(&slugify(fragment))),
            None => base,
        }
    }
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_uri_component)
        .collect::<Vec<_>>()
        .join("/")
}

/// A wikilink found in text, with its byte range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLinkMatch {
    pub start: usize,
    pub end: usize,
    pub link: WikiLink,
}

/// Find wikilinks in a run of text, skipping embeds (`![[...]]`)
pub fn find_wikilinks(text: &str) -> Vec<WikiLinkMatch> {
    WIKILINK_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            if full.start() > 0 && text.as_bytes().get(full.start() - 1) == Some(&b'!') {
                return None;
            }
            let link = WikiLink::parse(caps.get(1)?.as_str());
            if link.target.is_empty() && link.fragment.is_none() {
                return None;
            }
            Some(WikiLinkMatch {
                start: full.start(),
                end: full.end(),
                link,
            })
        })
        .collect()
}

/// Replace each wikilink with its display text (for plain-text contexts)
pub fn replace_with_display_text(text: &str) -> String {
    let matches = find_wikilinks(text);
    if matches.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in matches {
        out.push_str(&text[last..m.start]);
        out.push_str(&m.link.display_text());
        last = m.end;
    }
    out.push_str(&text[last..]);
    out
}
