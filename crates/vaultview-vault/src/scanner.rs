//! Vault scanner: walks the vault, reads and parses every note, builds the tree.
//!
//! Hidden entries (names starting with `.`, including `.git`) are skipped at
//! every level. Symlinks are not followed.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::instrument;
use vaultview_core::prelude::*;
use vaultview_core::basename_of;
use vaultview_parser::{frontmatter_title, parse_frontmatter, split_frontmatter};
use walkdir::{DirEntry, WalkDir};

/// A blocking task that panicked or was cancelled
pub(crate) fn task_failed(task: &str, err: tokio::task::JoinError) -> Error {
    Error::concurrency_error(format!("{} task failed: {}", task, err))
}

/// Result of a full scan
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Notes in directory-walk order (sorted by file name per directory)
    pub notes: Vec<Note>,
    /// Files that could not be read or decoded
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Reads the vault directory into notes and a navigation tree
#[derive(Debug, Clone)]
pub struct VaultScanner {
    root: PathBuf,
    concurrency: usize,
    max_file_size: u64,
    metrics: PipelineMetrics,
}

impl VaultScanner {
    pub fn new(config: &ViewerConfig, metrics: PipelineMetrics) -> Self {
        Self {
            root: config.vault_path.clone(),
            concurrency: config.scan_concurrency.max(1),
            max_file_size: config.max_file_size,
            metrics,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read every `.md` file under the root.
    ///
    /// Fails only when a directory cannot be listed. Files that vanish or
    /// cannot be decoded mid-scan are logged and skipped.
    #[instrument(skip(self), name = "vault_scan_all")]
    pub async fn scan_all(&self) -> Result<ScanOutcome> {
        let started = Instant::now();
        let _timer = self.metrics.scan_ms.timer();

        let root = self.root.clone();
        let files = tokio::task::spawn_blocking(move || list_markdown_files(&root))
            .await
            .map_err(|e| task_failed("scan", e))??;
        log::debug!("Found {} markdown files", files.len());

        // `buffered` keeps walk order so the link index is built deterministically
        let loaded: Vec<Option<Note>> = stream::iter(files)
            .map(|(slug, path)| async move { self.load(slug, &path).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        let total = loaded.len();
        let notes: Vec<Note> = loaded.into_iter().flatten().collect();
        let skipped = total - notes.len();

        self.metrics.scans.increment();
        self.metrics.skipped_files.add(skipped as u64);

        let elapsed = started.elapsed();
        log::info!(
            "Scanned {} notes in {:?} ({} skipped)",
            notes.len(),
            elapsed,
            skipped
        );

        Ok(ScanOutcome {
            notes,
            skipped,
            elapsed,
        })
    }

    /// Read a single note from disk. `None` when missing or unreadable.
    pub async fn read_note(&self, slug: &str, path: &Path) -> Option<Note> {
        match read_note_file(slug, path, self.max_file_size).await {
            Ok(note) => Some(note),
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Cannot read note {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn load(&self, slug: String, path: &Path) -> Option<Note> {
        match read_note_file(&slug, path, self.max_file_size).await {
            Ok(note) => Some(note),
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Build the navigation tree: folders first, then by name. Empty folders
    /// are included; only `.md` files are listed.
    #[instrument(skip(self), name = "vault_tree")]
    pub async fn tree(&self) -> Result<Vec<FileTreeItem>> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || read_tree(&root, ""))
            .await
            .map_err(|e| task_failed("tree", e))?
    }
}

/// Parse raw file text into a [`Note`].
///
/// Malformed front-matter is logged and treated as empty; the body is kept.
pub fn parse_note(slug: &str, raw: &str, last_modified: DateTime<Utc>) -> Note {
    let (yaml, body) = split_frontmatter(raw);

    let frontmatter = match yaml {
        Some(yaml) => parse_frontmatter(yaml).unwrap_or_else(|e| {
            log::warn!("Ignoring front-matter of {}: {}", slug, e);
            Frontmatter::new()
        }),
        None => Frontmatter::new(),
    };

    let title = frontmatter_title(&frontmatter).unwrap_or_else(|| basename_of(slug).to_string());

    Note {
        slug: slug.to_string(),
        title,
        path: slug.to_string(),
        content: body.to_string(),
        frontmatter,
        last_modified,
    }
}

async fn read_note_file(slug: &str, path: &Path, max_file_size: u64) -> Result<Note> {
    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > max_file_size {
        return Err(Error::other(format!(
            "file is {} bytes, limit is {}",
            metadata.len(),
            max_file_size
        )));
    }

    let bytes = tokio::fs::read(path).await?;
    let raw = String::from_utf8(bytes).map_err(|_| Error::parse_error("file is not valid UTF-8"))?;

    let last_modified = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    Ok(parse_note(slug, &raw, last_modified))
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn enumeration_error(kind: Option<std::io::ErrorKind>) -> Error {
    match kind {
        Some(kind) => Error::scan_enumeration(format!("directory listing failed ({})", kind)),
        None => Error::scan_enumeration("directory listing failed"),
    }
}

/// Slug for a file under `root`: relative path, `/`-separated, `.md` removed
fn slug_for(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect();
    parts?.join("/").strip_suffix(".md").map(str::to_string)
}

/// All `(slug, path)` pairs for markdown files, in sorted walk order
fn list_markdown_files(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !root.is_dir() {
        return Err(Error::scan_enumeration("vault root is not a directory"));
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry: &DirEntry| {
            entry.depth() == 0 || !entry.file_name().to_str().is_some_and(is_hidden)
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            log::warn!("Cannot list {:?}: {}", e.path(), e);
            enumeration_error(e.io_error().map(|io| io.kind()))
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        let is_markdown = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(".md"));
        if !is_markdown {
            continue;
        }

        match slug_for(root, entry.path()) {
            Some(slug) if !slug.is_empty() => files.push((slug, entry.into_path())),
            _ => log::warn!("Skipping non UTF-8 path {:?}", entry.path()),
        }
    }

    Ok(files)
}

/// Case-insensitive name order; on a tie lowercase sorts before uppercase
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn sort_tree(items: &mut [FileTreeItem]) {
    items.sort_by(|a, b| match (a.is_folder(), b.is_folder()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => compare_names(&a.name, &b.name),
    });
}

fn read_tree(dir: &Path, prefix: &str) -> Result<Vec<FileTreeItem>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        log::warn!("Cannot list {}: {}", dir.display(), e);
        enumeration_error(Some(e.kind()))
    })?;

    let mut items = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| enumeration_error(Some(e.kind())))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if is_hidden(name) {
            continue;
        }

        let relative = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", prefix, name)
        };

        let file_type = entry
            .file_type()
            .map_err(|e| enumeration_error(Some(e.kind())))?;
        if file_type.is_dir() {
            let children = read_tree(&entry.path(), &relative)?;
            items.push(FileTreeItem::folder(name, relative, children));
        } else if file_type.is_file()
            && let Some(stem) = name.strip_suffix(".md")
        {
            items.push(FileTreeItem::file(stem, relative));
        }
    }

    sort_tree(&mut items);
    Ok(items)
}
