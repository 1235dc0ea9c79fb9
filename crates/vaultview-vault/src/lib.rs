//! # Vault
//!
//! Scanning, caching, link resolution and git sync for a markdown vault.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vaultview_vault::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let manager = VaultManager::new(ViewerConfig::for_vault("/srv/vault"));
//!     manager.warm_caches().await?;
//!
//!     if let Some(note) = manager.get_note("Notes/Foo").await? {
//!         let html = manager.render(&note.content, Some(note.slug.as_str())).await?;
//!         println!("{}", html);
//!     }
//!
//!     let result = manager.run_sync().await;
//!     println!("sync ok: {}", result.success);
//!     Ok(())
//! }
//! ```
//!
//! ## Core Modules
//!
//! - [`manager::VaultManager`] - the facade; construct once and share
//! - [`scanner`] - directory walk, note parsing and the navigation tree
//! - [`notes_cache`] - whole-snapshot cache with a shared in-flight scan
//! - [`link_index`] - wikilink target to slug lookup
//! - [`render_cache`] - bounded, TTL-expiring HTML cache
//! - [`sync`] - git pull followed by an atomic cache rebuild
//! - [`git`] - the git collaborator and credential redaction
//!
//! ## Consistency
//!
//! A sync swaps the notes snapshot whole. Readers holding the previous
//! `Arc<NotesSnapshot>` keep a complete view; new readers get the new one.
//! The link index lives inside the snapshot, so it can never disagree with
//! the notes it was derived from.

pub mod git;
pub mod link_index;
pub mod manager;
pub mod notes_cache;
pub mod render_cache;
pub mod scanner;
pub mod sync;

pub use git::{CommandGitClient, GitClient, GitRemote, authenticated_url, redact_credentials};
pub use link_index::LinkIndex;
pub use manager::{SidebarBundle, VaultManager};
pub use notes_cache::{NotesCache, NotesSnapshot};
pub use render_cache::{RenderCache, cache_key};
pub use scanner::{ScanOutcome, VaultScanner};
pub use sync::{SyncOrchestrator, SyncTarget};

pub mod prelude {
    pub use crate::git::{CommandGitClient, GitClient};
    pub use crate::link_index::LinkIndex;
    pub use crate::manager::{SidebarBundle, VaultManager};
    pub use crate::notes_cache::NotesSnapshot;
    pub use crate::sync::SyncTarget;
    pub use vaultview_core::prelude::*;
}
