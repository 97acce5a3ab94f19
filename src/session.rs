//! One open workspace: board state, staged blobs, slot storage and config.
//!
//! ```text
//! <workspace>/
//! ├── config.toml        optional, see crate::config
//! ├── blobs/<id>.<ext>   staged copies behind every ImageItem::src
//! └── storage/<slot>.json
//! ```
//!
//! Every mutating method applies one board operation, then persists exactly
//! the buckets it reported as touched. Items leave the board for good only
//! through [`Session::discard`] and [`Session::clear_all`], and both hand the
//! removed items to [`BlobStore::release`].

use crate::blobs::{BlobError, BlobStore};
use crate::board::{Board, BoardError, Bucket, Changes};
use crate::config::{self, ConfigError, RankerConfig};
use crate::export::{self, ExportError};
use crate::intake::{self, IntakeError};
use crate::interaction::{RankingDrag, TierDrag, TierEditor, TierSlot};
use crate::persist::{self, PersistError, SLOT_VIEW_MODE};
use crate::storage::{FileStore, KeyValueStore};
use crate::types::{ImageId, TierKey, ViewMode};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Session<S: KeyValueStore = FileStore> {
    workspace: PathBuf,
    board: Board,
    blobs: BlobStore,
    store: S,
    config: RankerConfig,
}

impl Session<FileStore> {
    /// Open (creating if needed) the workspace at `workspace`.
    pub fn open(workspace: &Path) -> Result<Self, SessionError> {
        std::fs::create_dir_all(workspace)?;
        let config = config::load_config(workspace)?;
        Ok(Self::with_store(workspace, FileStore::new(workspace), config))
    }
}

impl<S: KeyValueStore> Session<S> {
    /// Restore the board from `store`. A store that has never recorded a
    /// view mode starts in `board.default_mode`.
    pub fn with_store(workspace: &Path, store: S, config: RankerConfig) -> Self {
        let mut board = persist::load(&store, &config.tiers.palette);
        if matches!(store.get(SLOT_VIEW_MODE), Ok(None)) {
            board.set_mode(config.board.default_mode);
        }
        debug!(
            workspace = %workspace.display(),
            images = board.len(),
            mode = %board.mode(),
            "opened session"
        );
        Self {
            workspace: workspace.to_path_buf(),
            board,
            blobs: BlobStore::new(workspace),
            store,
            config,
        }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn commit(&mut self, changes: Changes) -> Result<(), SessionError> {
        if !changes.is_empty() {
            persist::save(&mut self.store, &self.board, changes)?;
        }
        Ok(())
    }

    /// Resolve an item reference (id, unique id prefix, or file name).
    pub fn item(&self, reference: &str) -> Result<ImageId, SessionError> {
        Ok(self.board.resolve(reference)?)
    }

    /// Resolve a tier reference (key or name).
    pub fn tier(&self, reference: &str) -> Result<TierKey, SessionError> {
        Ok(self.board.tier_key(reference)?)
    }

    // =========================================================================
    // Intake and removal
    // =========================================================================

    /// Stage the images found at `paths` and append them to the pool.
    pub fn upload(&mut self, paths: &[PathBuf]) -> Result<Vec<ImageId>, SessionError> {
        let items = intake::intake(&self.blobs, paths)?;
        let ids: Vec<ImageId> = items.iter().map(|i| i.id.clone()).collect();
        let changes = self.board.add_unranked(items);
        self.commit(changes)?;
        info!(count = ids.len(), "added images");
        Ok(ids)
    }

    /// Remove an item from the board and release its blob.
    pub fn discard(&mut self, id: &ImageId) -> Result<(), SessionError> {
        let (item, changes) = self
            .board
            .take(id)
            .ok_or_else(|| BoardError::UnknownItem(id.to_string()))?;
        self.commit(changes)?;
        self.blobs.release(item)?;
        Ok(())
    }

    /// Release every item, restore the default tiers and view mode, remove
    /// every slot, and sweep any blob left behind.
    pub fn clear_all(&mut self) -> Result<(), SessionError> {
        let items = self.board.drain();
        let count = items.len();
        let mut first_err = None;
        for item in items {
            if let Err(e) = self.blobs.release(item) {
                warn!(error = %e, "could not release blob");
                first_err.get_or_insert(e);
            }
        }
        self.board.set_mode(self.config.board.default_mode);
        persist::clear(&mut self.store)?;
        let swept = self.blobs.sweep(std::iter::empty::<&str>())?;
        info!(released = count, swept, "cleared workspace");
        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Moves
    // =========================================================================

    pub fn promote(&mut self, id: &ImageId) -> Result<(), SessionError> {
        let changes = self.board.promote(id)?;
        self.commit(changes)
    }

    pub fn demote(&mut self, id: &ImageId) -> Result<(), SessionError> {
        let changes = self.board.demote(id)?;
        self.commit(changes)
    }

    /// Move the ranked item at `from` to position `to` (0-based).
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), SessionError> {
        let mut drag = RankingDrag::default();
        drag.start(from);
        self.drop_ranked(&mut drag, to)
    }

    /// Finish a ranking drag on position `target`.
    pub fn drop_ranked(&mut self, drag: &mut RankingDrag, target: usize) -> Result<(), SessionError> {
        let changes = drag.drop_on(&mut self.board, target)?;
        self.commit(changes)
    }

    /// Move an item into a tier or back to the pool.
    ///
    /// The item must be in the pool or a tier; ranked items are moved with
    /// [`Session::demote`] first.
    pub fn move_to(&mut self, id: &ImageId, target: TierSlot) -> Result<(), SessionError> {
        let source = match self.board.locate(id) {
            Some(Bucket::Unranked) => TierSlot::Unranked,
            Some(Bucket::Tier(key)) => TierSlot::Tier(key),
            Some(Bucket::Ranked) => return Err(BoardError::NotInPool(id.clone()).into()),
            None => return Err(BoardError::UnknownItem(id.to_string()).into()),
        };
        let mut drag = TierDrag::default();
        drag.start(id.clone(), source);
        self.drop_tier(&mut drag, target)
    }

    /// Finish a tier drag on `target`.
    pub fn drop_tier(&mut self, drag: &mut TierDrag, target: TierSlot) -> Result<(), SessionError> {
        let changes = drag.drop_on(&mut self.board, target)?;
        self.commit(changes)
    }

    pub fn set_mode(&mut self, mode: ViewMode) -> Result<(), SessionError> {
        let changes = self.board.set_mode(mode);
        self.commit(changes)
    }

    // =========================================================================
    // Tiers
    // =========================================================================

    pub fn add_tier(&mut self) -> Result<TierKey, SessionError> {
        let (key, changes) = self.board.add_tier();
        self.commit(changes)?;
        Ok(key)
    }

    /// Remove a tier, returning its images to the pool.
    pub fn remove_tier(&mut self, key: &TierKey) -> Result<(), SessionError> {
        let changes = self.board.remove_tier(key)?;
        self.commit(changes)
    }

    pub fn rename_tier(&mut self, key: &TierKey, name: &str) -> Result<(), SessionError> {
        let changes = self.board.rename_tier(key, name)?;
        self.commit(changes)
    }

    pub fn recolor_tier(&mut self, key: &TierKey, color: &str) -> Result<(), SessionError> {
        let changes = self.board.recolor_tier(key, color)?;
        self.commit(changes)
    }

    /// Start editing a tier's name.
    pub fn begin_edit(&self, editor: &mut TierEditor, key: &TierKey) -> Result<(), SessionError> {
        Ok(editor.begin(&self.board, key)?)
    }

    /// Apply an in-progress name edit. A blank draft keeps the old name.
    pub fn commit_edit(&mut self, editor: &mut TierEditor) -> Result<(), SessionError> {
        let changes = editor.commit(&mut self.board)?;
        self.commit(changes)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Write the current view as `<dir>/<export.filename>.png`.
    pub fn export(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        export::export_png(&self.board, &self.blobs, &self.config, dir)
    }
}
