//! Core data models for vault notes, the navigation tree and cache state.
//!
//! These types are designed to be:
//! - **Serializable**: camelCase JSON matching what the web layer returns
//! - **Cloneable**: snapshots hand them out behind `Arc`
//! - **Type-Safe**: enums replace magic strings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parsed front-matter: string keys to arbitrary YAML values (as JSON values)
pub type Frontmatter = serde_json::Map<String, serde_json::Value>;

/// One parsed markdown file.
///
/// Immutable once scanned; a changed file produces a new `Note` at the next rescan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Vault-relative path without the `.md` suffix
    pub slug: String,
    /// Front-matter `title`, else the file's base name
    pub title: String,
    /// Same as `slug`; kept for the web layer's URL building
    pub path: String,
    /// Markdown body with front-matter stripped
    pub content: String,
    pub frontmatter: Frontmatter,
    pub last_modified: DateTime<Utc>,
}

impl Note {
    /// Base name of the slug (last `/` segment)
    pub fn basename(&self) -> &str {
        basename_of(&self.slug)
    }

    /// Case-insensitive substring match over title and content
    pub fn matches_query(&self, lowercase_query: &str) -> bool {
        self.title.to_lowercase().contains(lowercase_query)
            || self.content.to_lowercase().contains(lowercase_query)
    }

    /// Lightweight view without content
    pub fn summary(&self) -> NoteSummary {
        NoteSummary {
            slug: self.slug.clone(),
            title: self.title.clone(),
            path: self.path.clone(),
            last_modified: self.last_modified,
            frontmatter: self.frontmatter.clone(),
        }
    }
}

/// Last `/`-separated segment of a slug or path
pub fn basename_of(slug: &str) -> &str {
    slug.rsplit('/').next().unwrap_or(slug)
}

/// A note without its body, for list endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummary {
    pub slug: String,
    pub title: String,
    pub path: String,
    pub last_modified: DateTime<Utc>,
    pub frontmatter: Frontmatter,
}

/// Kind of entry in the navigation tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Folder,
}

/// One entry (file or folder) in the navigable tree.
///
/// Siblings are ordered folders first, then by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileTreeItem {
    /// Display name (`.md` stripped for files)
    pub name: String,
    /// Path relative to the vault root (files keep their `.md`)
    pub path: String,
    #[serde(rename = "type")]
    pub type_: FileType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileTreeItem>>,
}

impl FileTreeItem {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            type_: FileType::File,
            children: None,
        }
    }

    pub fn folder(
        name: impl Into<String>,
        path: impl Into<String>,
        children: Vec<FileTreeItem>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            type_: FileType::Folder,
            children: Some(children),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.type_ == FileType::Folder
    }

    /// Number of file entries in this subtree
    pub fn file_count(&self) -> usize {
        match &self.children {
            Some(children) => children.iter().map(FileTreeItem::file_count).sum(),
            None => usize::from(self.type_ == FileType::File),
        }
    }
}

/// A heading extracted for a table of contents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Heading {
    /// 1 to 6
    pub depth: u8,
    pub text: String,
    /// Anchor id, unique within the document
    pub slug: String,
}

/// Notes-cache observability
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotesCacheStats {
    pub count: usize,
    /// Milliseconds since the snapshot was scanned (0 when empty)
    pub age_ms: u64,
    pub is_populated: bool,
}

/// Render-cache observability
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderCacheStats {
    pub entries: usize,
    pub max_entries: usize,
    pub ttl_ms: u64,
}

/// Combined view returned by `get_cache_stats`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub notes: NotesCacheStats,
    pub render: RenderCacheStats,
    /// Keys in the link-resolution index, `None` when not built
    pub link_index_keys: Option<usize>,
    pub metrics: crate::metrics::MetricsSnapshot,
}

/// Outcome of a sync request.
///
/// Serializes as `{success, timestamp}` or `{success, error}` (plus `busy`
/// when rejected because another sync is running).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Notes in the rebuilt snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<usize>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub busy: bool,
}

impl SyncResult {
    pub fn succeeded(timestamp: DateTime<Utc>, notes: usize) -> Self {
        Self {
            success: true,
            timestamp: Some(timestamp),
            error: None,
            notes: Some(notes),
            busy: false,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            timestamp: None,
            error: Some(error.into()),
            notes: None,
            busy: false,
        }
    }

    pub fn busy() -> Self {
        Self {
            busy: true,
            ..Self::failed("Sync already in progress")
        }
    }
}
