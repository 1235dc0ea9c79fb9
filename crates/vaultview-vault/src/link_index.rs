//! Link-resolution index: lowercase lookup key to canonical slug.
//!
//! Every note contributes its base name, its full slug and each path suffix
//! (`Weekly/2025/W51-Plan` yields `w51-plan`, `2025/w51-plan` and
//! `weekly/2025/w51-plan`). When two notes claim the same key the one
//! indexed first keeps it, so an ambiguous base name always resolves to the
//! same note for a given vault layout.

use std::collections::HashMap;
use vaultview_core::Note;
use vaultview_parser::{LinkResolver, Resolution, ResolutionTier};

#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    keys: HashMap<String, String>,
}

impl LinkIndex {
    /// Build from notes in scan order
    pub fn build<'a>(notes: impl IntoIterator<Item = &'a Note>) -> Self {
        let mut index = Self::default();
        for note in notes {
            index.insert_slug(&note.slug);
        }
        log::debug!("Link index built with {} keys", index.keys.len());
        index
    }

    fn insert_slug(&mut self, slug: &str) {
        let lower = slug.to_lowercase();
        let segments: Vec<&str> = lower.split('/').collect();
        // i == 0 is the full slug, the last one is the base name
        for i in 0..segments.len() {
            let key = segments[i..].join("/");
            if key.is_empty() {
                continue;
            }
            self.keys.entry(key).or_insert_with(|| slug.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Canonical slug stored under a lowercase key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.keys.get(key).map(String::as_str)
    }
}

/// Base name of a link target: directories and a `.md` suffix removed
fn target_basename(target: &str) -> &str {
    let name = target.rsplit('/').next().unwrap_or(target);
    name.strip_suffix(".md").unwrap_or(name)
}

impl LinkResolver for LinkIndex {
    fn resolve(&self, target: &str) -> Resolution {
        let lower = target.trim().to_lowercase();

        if let Some(slug) = self.get(&lower) {
            return Resolution::Resolved {
                slug: slug.to_string(),
                tier: ResolutionTier::Exact,
            };
        }

        let basename = target_basename(&lower);
        if basename != lower
            && let Some(slug) = self.get(basename)
        {
            return Resolution::Resolved {
                slug: slug.to_string(),
                tier: ResolutionTier::Basename,
            };
        }

        Resolution::Unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vaultview_core::Frontmatter;

    fn note(slug: &str) -> Note {
        Note {
            slug: slug.to_string(),
            title: slug.to_string(),
            path: slug.to_string(),
            content: String::new(),
            frontmatter: Frontmatter::new(),
            last_modified: Utc::now(),
        }
    }

    fn resolved(slug: &str, tier: ResolutionTier) -> Resolution {
        Resolution::Resolved {
            slug: slug.to_string(),
            tier,
        }
    }

    #[test]
    fn test_keys_for_nested_slug() {
        let index = LinkIndex::build(&[note("Weekly/2025/W51-Plan")]);
        assert_eq!(index.len(), 3);
        for key in ["w51-plan", "2025/w51-plan", "weekly/2025/w51-plan"] {
            assert_eq!(index.get(key), Some("Weekly/2025/W51-Plan"));
        }
    }

    #[test]
    fn test_first_writer_wins() {
        let index = LinkIndex::build(&[note("a/Readme"), note("b/Readme")]);
        assert_eq!(index.get("readme"), Some("a/Readme"));
        assert_eq!(index.get("b/readme"), Some("b/Readme"));
        assert_eq!(index.resolve("Readme"), resolved("a/Readme", ResolutionTier::Exact));
    }

    #[test]
    fn test_resolution_tiers() {
        let index = LinkIndex::build(&[note("Notes/Foo"), note("a/b")]);

        assert_eq!(index.resolve("FOO"), resolved("Notes/Foo", ResolutionTier::Exact));
        assert_eq!(index.resolve("notes/foo"), resolved("Notes/Foo", ResolutionTier::Exact));
        assert_eq!(index.resolve("b"), resolved("a/b", ResolutionTier::Exact));
        assert_eq!(
            index.resolve("elsewhere/Foo.md"),
            resolved("Notes/Foo", ResolutionTier::Basename)
        );
        assert_eq!(index.resolve("Foo.md"), resolved("Notes/Foo", ResolutionTier::Basename));
        assert_eq!(index.resolve("missing"), Resolution::Unresolved);
    }

    #[test]
    fn test_empty_index() {
        let index = LinkIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.resolve("anything"), Resolution::Unresolved);
    }
}
