//! Revocable resource handles behind [`ImageItem::src`].
//!
//! Every accepted upload is staged as a private copy under
//! `<workspace>/blobs/<id>.<ext>`; the item's `src` is that path relative to
//! the workspace. The copy lives exactly as long as the item:
//!
//! ```text
//! acquire(file)  →  ImageItem { src: "blobs/<id>.png", .. }   (copy created)
//! release(item)  →  ()                                         (copy deleted)
//! ```
//!
//! [`BlobStore::release`] takes the item by value. `ImageItem` is not
//! `Clone`, so once an item has been released there is nothing left to
//! release again. Every removal path in [`crate::session`] (single discard,
//! full reset) funnels through it.

use crate::types::{ImageId, ImageItem};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Directory, relative to the workspace, holding staged blobs.
pub const BLOB_DIR: &str = "blobs";

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("{0} has no file name")]
    NoFileName(PathBuf),
}

/// Owner of the staged blob directory of one workspace.
#[derive(Debug, Clone)]
pub struct BlobStore {
    workspace: PathBuf,
}

impl BlobStore {
    pub fn new(workspace: &Path) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
        }
    }

    fn dir(&self) -> PathBuf {
        self.workspace.join(BLOB_DIR)
    }

    /// Stage a copy of `source` and wrap it as a new [`ImageItem`].
    pub fn acquire(&self, source: &Path) -> Result<ImageItem, BlobError> {
        let alt = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| BlobError::NoFileName(source.to_path_buf()))?;
        let ext = source
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let id = ImageId::generate();
        let file_name = if ext.is_empty() {
            id.to_string()
        } else {
            format!("{id}.{ext}")
        };
        std::fs::create_dir_all(self.dir())?;
        std::fs::copy(source, self.dir().join(&file_name))?;
        debug!(id = %id, source = %source.display(), "acquired blob");

        Ok(ImageItem {
            id,
            src: format!("{BLOB_DIR}/{file_name}"),
            alt,
        })
    }

    /// Absolute path of the blob behind `item`.
    pub fn resolve(&self, item: &ImageItem) -> PathBuf {
        self.workspace.join(&item.src)
    }

    /// Release the blob behind `item`, consuming the item.
    ///
    /// A blob that is already gone is logged, not an error. A `src` that
    /// does not point into the blob directory is never deleted.
    pub fn release(&self, item: ImageItem) -> Result<(), BlobError> {
        let Some(file_name) = blob_file_name(&item.src) else {
            warn!(id = %item.id, src = %item.src, "refusing to release blob outside {BLOB_DIR}/");
            return Ok(());
        };
        match std::fs::remove_file(self.dir().join(file_name)) {
            Ok(()) => {
                debug!(id = %item.id, "released blob");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(id = %item.id, src = %item.src, "blob already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// File names of every blob currently staged, sorted.
    pub fn staged(&self) -> Result<Vec<String>, BlobError> {
        let dir = self.dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Delete staged blobs that no item references. Returns how many were
    /// removed.
    pub fn sweep<'a>(&self, live: impl IntoIterator<Item = &'a str>) -> Result<usize, BlobError> {
        let live: HashSet<&str> = live.into_iter().filter_map(blob_file_name).collect();
        let mut removed = 0;
        for name in self.staged()? {
            if !live.contains(name.as_str()) {
                std::fs::remove_file(self.dir().join(&name))?;
                warn!(blob = %name, "swept orphaned blob");
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// The file-name part of a `blobs/<name>` locator, if it is one.
fn blob_file_name(src: &str) -> Option<&str> {
    let name = src.strip_prefix(BLOB_DIR)?.strip_prefix('/')?;
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
        return None;
    }
    Some(name)
}
