//! GitHub-style heading anchors.
//!
//! `slugify` lowercases, keeps letters, digits, `-` and `_`, turns each
//! space into `-` and drops everything else. Runs of dashes are kept, so
//! `"A - B"` becomes `"a---b"`, which is what GitHub produces.
//!
//! [`Slugger`] adds per-document de-duplication: the second `Intro`
//! becomes `intro-1`, the third `intro-2`.

use std::collections::HashMap;

/// Slug a heading text without de-duplication
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

/// Stateful slugger; use one per rendered document
#[derive(Debug, Default, Clone)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique slug for `text` within this document
    pub fn slug(&mut self, text: &str) -> String {
        let original = slugify(text);
        let mut result = original.clone();

        while self.occurrences.contains_key(&result) {
            let count = self.occurrences.entry(original.clone()).or_insert(0);
            *count += 1;
            result = format!("{}-{}", original, count);
        }

        self.occurrences.insert(result.clone(), 0);
        result
    }

    /// Forget every slug handed out so far
    pub fn reset(&mut self) {
        self.occurrences.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Next Steps"), "next-steps");
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("A - B"), "a---b");
        assert_eq!(slugify("snake_case Title"), "snake_case-title");
        assert_eq!(slugify("Café Crème"), "café-crème");
        assert_eq!(slugify("v1.2 (beta)"), "v12-beta");
    }

    #[test]
    fn test_duplicates_get_suffixes() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Intro"), "intro");
        assert_eq!(slugger.slug("Intro"), "intro-1");
        assert_eq!(slugger.slug("Intro"), "intro-2");
        assert_eq!(slugger.slug("Other"), "other");
    }

    #[test]
    fn test_suffix_collision_with_literal_heading() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Intro 1"), "intro-1");
        assert_eq!(slugger.slug("Intro"), "intro");
        // "intro-1" is taken by the literal heading above
        assert_eq!(slugger.slug("Intro"), "intro-2");
    }

    #[test]
    fn test_reset() {
        let mut slugger = Slugger::new();
        slugger.slug("A");
        slugger.reset();
        assert_eq!(slugger.slug("A"), "a");
    }
}
