//! Slug validation: the boundary between caller input and the filesystem.
//!
//! Every path built from a caller-supplied slug must go through
//! [`SlugValidator::validate`] first. Rules, in order:
//!
//! 1. Null bytes are stripped (not rejected).
//! 2. `..` or `\` anywhere is a traversal attempt.
//! 3. The slug joined onto the vault root and normalized must stay under the root.
//!    Leading `/` is ignored for the join, so `/etc/passwd` names
//!    `<vault>/etc/passwd.md`.
//! 4. At most [`MAX_SLUG_LEN`] characters.
//! 5. Only ASCII letters, digits, space and `_ - / . & , : ; ( )` are allowed;
//!    an empty slug has no valid characters and is rejected too.

use crate::error::{Error, Result};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

/// Allow-list for slug characters (hyphen last so it is not a range)
static SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_/. &,:;()-]+$").unwrap());

/// Longest slug accepted, in characters
pub const MAX_SLUG_LEN: usize = 500;

/// Validates caller-supplied slugs against a vault root
#[derive(Debug, Clone)]
pub struct SlugValidator {
    vault_root: PathBuf,
}

impl SlugValidator {
    /// Create a validator for the given vault root
    pub fn new(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
        }
    }

    pub fn vault_root(&self) -> &Path {
        &self.vault_root
    }

    /// Validate a slug, returning the cleaned slug
    pub fn validate(&self, raw: &str) -> Result<String> {
        let slug = strip_null_bytes(raw);

        if slug.contains("..") || slug.contains('\\') {
            return Err(Error::path_traversal());
        }

        let joined = self.vault_root.join(format!("{}.md", relative(&slug)));
        if !normalize(&joined).starts_with(normalize(&self.vault_root)) {
            return Err(Error::path_traversal());
        }

        if slug.chars().count() > MAX_SLUG_LEN || !SLUG_CHARS.is_match(&slug) {
            return Err(Error::invalid_characters());
        }

        Ok(slug)
    }

    /// Validate a slug and return it in vault-relative form with the
    /// markdown file path it maps to
    pub fn note_path(&self, raw: &str) -> Result<(String, PathBuf)> {
        let slug = self.validate(raw)?;
        let slug = relative(&slug).to_string();
        let path = self.vault_root.join(format!("{}.md", slug));
        Ok((slug, path))
    }
}

/// `Path::join` replaces the base when given an absolute path
fn relative(slug: &str) -> &str {
    slug.trim_start_matches('/')
}

fn strip_null_bytes(raw: &str) -> String {
    raw.chars().filter(|&c| c != '\0').collect()
}

/// Lexical normalization (no filesystem access): drops `.`, applies `..`.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> SlugValidator {
        SlugValidator::new("/vault")
    }

    #[test]
    fn test_blocks_dot_dot_traversal() {
        let v = validator();
        assert!(matches!(v.validate("../etc/passwd"), Err(Error::PathTraversal)));
        assert!(matches!(v.validate(" ../../etc/passwd"), Err(Error::PathTraversal)));
        assert!(matches!(v.validate("folder/../escape"), Err(Error::PathTraversal)));
    }

    #[test]
    fn test_blocks_backslashes() {
        let v = validator();
        assert!(matches!(v.validate("..\\windows\\system32"), Err(Error::PathTraversal)));
        assert!(matches!(v.validate("folder\\escape"), Err(Error::PathTraversal)));
    }

    #[test]
    fn test_leading_slash_stays_inside_vault() {
        let v = validator();
        assert_eq!(v.validate("/etc/passwd").unwrap(), "/etc/passwd");

        let (slug, path) = v.note_path("/etc/passwd").unwrap();
        assert_eq!(slug, "etc/passwd");
        assert_eq!(path, PathBuf::from("/vault/etc/passwd.md"));

        assert!(matches!(v.validate("/../etc/passwd"), Err(Error::PathTraversal)));
    }

    #[test]
    fn test_length_cap() {
        let v = validator();
        let longest = "a".repeat(MAX_SLUG_LEN);
        assert_eq!(v.validate(&longest).unwrap(), longest);
        assert!(matches!(
            v.validate(&"a".repeat(MAX_SLUG_LEN + 1)),
            Err(Error::InvalidCharacters)
        ));
        // Null bytes do not count toward the cap
        assert!(v.validate(&format!("{}\0", longest)).is_ok());
    }

    #[test]
    fn test_strips_null_bytes() {
        assert_eq!(validator().validate("note\0.txt").unwrap(), "note.txt");
    }

    #[test]
    fn test_allowed_characters_are_identity() {
        let v = validator();
        for slug in [
            "MyNote123",
            "My Note",
            "Dev - Kids Space",
            "Timeline & Milestones",
            "Note: Draft",
            "Note; Tag",
            "folder/subfolder",
            "00 Ideas Inbox/Dev - Kids Space",
            "2025-01-15",
            "Weekly/2025/W51-Plan",
            "my_note-test",
            "Technical Challenge (Backend)",
            "a, b",
            "a/b/c/d/e/f",
            "  My Note  ",
            "a",
        ] {
            assert_eq!(v.validate(slug).unwrap(), slug);
        }
    }

    #[test]
    fn test_rejects_disallowed_characters() {
        let v = validator();
        for slug in [
            "note$pecial",
            "note@home",
            "note#tag",
            "note!important",
            "note`command`",
            "note|pipe",
            "note$(command)",
            "note<script>",
            "note>",
            "note[1]",
            "note{test}",
            "Feature + Update",
        ] {
            assert!(
                matches!(v.validate(slug), Err(Error::InvalidCharacters)),
                "expected rejection for {:?}",
                slug
            );
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(validator().validate(""), Err(Error::InvalidCharacters)));
        assert!(matches!(validator().validate("\0"), Err(Error::InvalidCharacters)));
    }

    #[test]
    fn test_note_path() {
        let (slug, path) = validator().note_path("Notes/Foo").unwrap();
        assert_eq!(slug, "Notes/Foo");
        assert_eq!(path, PathBuf::from("/vault/Notes/Foo.md"));
    }

    #[test]
    fn test_error_message_has_no_path() {
        let err = validator().validate("../secret").unwrap_err();
        assert!(!err.to_string().contains("secret"));
        assert!(!err.to_string().contains("/vault"));
    }
}
