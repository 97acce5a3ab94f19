//! Collection state: the unranked pool, the ranked sequence and the tier list.
//!
//! # Ownership
//!
//! Every [`ImageItem`] lives in exactly one bucket:
//!
//! ```text
//!            promote (ranking mode)                 move_from_unranked
//!   ┌────────┐ ─────────────────────▶ ┌────────┐   ┌──────────────────▶ ┌──────┐
//!   │  pool  │                        │ ranked │   │                    │ tier │
//!   └────────┘ ◀───────────────────── └────────┘   │   ◀── demote ───── └──────┘
//!        │            demote                       │          ▲   │
//!        └─────────────────────────────────────────┘          └───┘
//!                                                        move_between_tiers
//! ```
//!
//! Items are not `Clone`; each move removes by value from one sequence and
//! pushes into another, and every fallible check (index bounds, tier keys,
//! presence) runs before the removal. A failed operation leaves the board
//! exactly as it was.
//!
//! # Change tracking
//!
//! Every mutating method returns [`Changes`], naming the buckets it touched
//! so [`crate::session`] can persist only those slots.

use crate::tiers::{TierError, TierList};
use crate::types::{ImageId, ImageItem, TierKey, ViewMode};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BoardError {
    #[error("no image matches '{0}'")]
    UnknownItem(String),
    #[error("'{reference}' matches {matches} images; use a longer id")]
    AmbiguousReference { reference: String, matches: usize },
    #[error("image {0} is not in the unranked pool")]
    NotInPool(ImageId),
    #[error("image {0} is not ranked or tiered")]
    NotPlaced(ImageId),
    #[error("position {index} is out of range for {len} ranked images")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Tier(#[from] TierError),
}

/// Where an item currently lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bucket {
    Unranked,
    Ranked,
    Tier(TierKey),
}

/// Buckets touched by a mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub unranked: bool,
    pub ranked: bool,
    pub tiers: bool,
    pub mode: bool,
}

impl Changes {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            unranked: true,
            ranked: true,
            tiers: true,
            mode: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }

    fn unranked() -> Self {
        Self {
            unranked: true,
            ..Self::none()
        }
    }

    fn ranked() -> Self {
        Self {
            ranked: true,
            ..Self::none()
        }
    }

    fn tiers() -> Self {
        Self {
            tiers: true,
            ..Self::none()
        }
    }

    fn with(self, bucket: &Bucket) -> Self {
        match bucket {
            Bucket::Unranked => Self {
                unranked: true,
                ..self
            },
            Bucket::Ranked => Self {
                ranked: true,
                ..self
            },
            Bucket::Tier(_) => Self {
                tiers: true,
                ..self
            },
        }
    }
}

/// The whole arrangement of one workspace.
#[derive(Debug, PartialEq, Eq)]
pub struct Board {
    unranked: Vec<ImageItem>,
    ranked: Vec<ImageItem>,
    tiers: TierList,
    mode: ViewMode,
}

impl Board {
    /// Empty board with the default tiers.
    pub fn new(palette: &[String]) -> Self {
        Self {
            unranked: Vec::new(),
            ranked: Vec::new(),
            tiers: TierList::with_defaults(palette),
            mode: ViewMode::default(),
        }
    }

    pub fn from_parts(
        unranked: Vec<ImageItem>,
        ranked: Vec<ImageItem>,
        tiers: TierList,
        mode: ViewMode,
    ) -> Self {
        Self {
            unranked,
            ranked,
            tiers,
            mode,
        }
    }

    pub fn unranked(&self) -> &[ImageItem] {
        &self.unranked
    }

    pub fn ranked(&self) -> &[ImageItem] {
        &self.ranked
    }

    pub fn tiers(&self) -> &TierList {
        &self.tiers
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) -> Changes {
        if self.mode == mode {
            return Changes::none();
        }
        self.mode = mode;
        Changes {
            mode: true,
            ..Changes::none()
        }
    }

    /// Every item on the board: pool, then ranked, then tiers in order.
    pub fn items(&self) -> impl Iterator<Item = &ImageItem> {
        self.unranked
            .iter()
            .chain(self.ranked.iter())
            .chain(self.tiers.items())
    }

    pub fn len(&self) -> usize {
        self.items().count()
    }

    pub fn is_empty(&self) -> bool {
        self.items().next().is_none()
    }

    /// Append freshly uploaded items to the pool.
    pub fn add_unranked(&mut self, items: Vec<ImageItem>) -> Changes {
        if items.is_empty() {
            return Changes::none();
        }
        self.unranked.extend(items);
        Changes::unranked()
    }

    /// Which bucket holds `id`.
    pub fn locate(&self, id: &ImageId) -> Option<Bucket> {
        if self.unranked.iter().any(|i| &i.id == id) {
            return Some(Bucket::Unranked);
        }
        if self.ranked.iter().any(|i| &i.id == id) {
            return Some(Bucket::Ranked);
        }
        self.tiers.tier_of(id).cloned().map(Bucket::Tier)
    }

    /// Resolve a user reference to an item id.
    ///
    /// Tried in order: exact id, exact file name, id prefix. The file name
    /// and prefix forms must match exactly one item.
    pub fn resolve(&self, reference: &str) -> Result<ImageId, BoardError> {
        if let Some(item) = self.items().find(|i| i.id.as_str() == reference) {
            return Ok(item.id.clone());
        }
        for matches in [
            self.items().filter(|i| i.alt == reference).collect::<Vec<_>>(),
            self.items()
                .filter(|i| !reference.is_empty() && i.id.as_str().starts_with(reference))
                .collect::<Vec<_>>(),
        ] {
            match matches.as_slice() {
                [] => continue,
                [one] => return Ok(one.id.clone()),
                many => {
                    return Err(BoardError::AmbiguousReference {
                        reference: reference.to_string(),
                        matches: many.len(),
                    });
                }
            }
        }
        Err(BoardError::UnknownItem(reference.to_string()))
    }

    /// Move the ranked item at `from` to position `to` (both 0-based).
    ///
    /// Equal indices are a no-op. Both indices must be in range.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<Changes, BoardError> {
        let len = self.ranked.len();
        for index in [from, to] {
            if index >= len {
                return Err(BoardError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(Changes::none());
        }
        let item = self.ranked.remove(from);
        self.ranked.insert(to, item);
        Ok(Changes::ranked())
    }

    /// Move a pool item to the end of the ranked sequence (ranking mode) or
    /// of the first tier (tier mode).
    pub fn promote(&mut self, id: &ImageId) -> Result<Changes, BoardError> {
        let pos = self.pool_position(id)?;
        match self.mode {
            ViewMode::Ranking => {
                let item = self.unranked.remove(pos);
                self.ranked.push(item);
                Ok(Changes::unranked().with(&Bucket::Ranked))
            }
            ViewMode::Tier => {
                let first = self
                    .tiers
                    .first_key()
                    .cloned()
                    .ok_or(TierError::MinimumTiers {
                        min: crate::tiers::MIN_TIERS,
                    })?;
                let item = self.unranked.remove(pos);
                self.append_to_tier(&first, item);
                Ok(Changes::unranked().with(&Bucket::Tier(first)))
            }
        }
    }

    /// Move an item out of the ranked sequence or its tier, back to the pool.
    pub fn demote(&mut self, id: &ImageId) -> Result<Changes, BoardError> {
        if let Some(pos) = self.ranked.iter().position(|i| &i.id == id) {
            let item = self.ranked.remove(pos);
            self.unranked.push(item);
            return Ok(Changes::ranked().with(&Bucket::Unranked));
        }
        if let Some((key, item)) = self.tiers.take(id) {
            self.unranked.push(item);
            return Ok(Changes::unranked().with(&Bucket::Tier(key)));
        }
        Err(BoardError::NotPlaced(id.clone()))
    }

    /// Move a pool item to the end of tier `target`.
    pub fn move_from_unranked(
        &mut self,
        id: &ImageId,
        target: &TierKey,
    ) -> Result<Changes, BoardError> {
        let pos = self.pool_position(id)?;
        if self.tiers.get(target).is_none() {
            return Err(TierError::UnknownTier(target.clone()).into());
        }
        let item = self.unranked.remove(pos);
        self.append_to_tier(target, item);
        Ok(Changes::unranked().with(&Bucket::Tier(target.clone())))
    }

    /// Move an item from tier `source` to the end of tier `target`.
    pub fn move_between_tiers(
        &mut self,
        id: &ImageId,
        source: &TierKey,
        target: &TierKey,
    ) -> Result<Changes, BoardError> {
        if self.tiers.move_between(id, source, target)? {
            Ok(Changes::tiers())
        } else {
            Ok(Changes::none())
        }
    }

    pub fn add_tier(&mut self) -> (TierKey, Changes) {
        (self.tiers.add(), Changes::tiers())
    }

    /// Remove a tier; its images go to the end of the pool.
    pub fn remove_tier(&mut self, key: &TierKey) -> Result<Changes, BoardError> {
        let items = self.tiers.remove(key)?;
        let moved = !items.is_empty();
        self.unranked.extend(items);
        Ok(Changes {
            unranked: moved,
            ..Changes::tiers()
        })
    }

    pub fn rename_tier(&mut self, key: &TierKey, name: &str) -> Result<Changes, BoardError> {
        self.tiers.rename(key, name)?;
        Ok(Changes::tiers())
    }

    pub fn recolor_tier(&mut self, key: &TierKey, color: &str) -> Result<Changes, BoardError> {
        self.tiers.recolor(key, color)?;
        Ok(Changes::tiers())
    }

    /// Resolve a tier reference (key or display name).
    pub fn tier_key(&self, reference: &str) -> Result<TierKey, BoardError> {
        Ok(self.tiers.lookup(reference)?.clone())
    }

    /// Remove an item from whichever bucket holds it.
    pub fn take(&mut self, id: &ImageId) -> Option<(ImageItem, Changes)> {
        if let Some(pos) = self.unranked.iter().position(|i| &i.id == id) {
            return Some((self.unranked.remove(pos), Changes::unranked()));
        }
        if let Some(pos) = self.ranked.iter().position(|i| &i.id == id) {
            return Some((self.ranked.remove(pos), Changes::ranked()));
        }
        self.tiers
            .take(id)
            .map(|(_, item)| (item, Changes::tiers()))
    }

    /// Empty every bucket and restore the default tiers. The view mode is
    /// kept. Returns every item that was on the board.
    pub fn drain(&mut self) -> Vec<ImageItem> {
        let mut items = std::mem::take(&mut self.unranked);
        items.append(&mut self.ranked);
        items.extend(self.tiers.drain_items());
        self.tiers = TierList::with_defaults(self.tiers.palette());
        items
    }

    fn pool_position(&self, id: &ImageId) -> Result<usize, BoardError> {
        self.unranked
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| BoardError::NotInPool(id.clone()))
    }

    /// Append to a tier whose key was validated by the caller.
    fn append_to_tier(&mut self, key: &TierKey, item: ImageItem) {
        if let Err((e, item)) = self.tiers.append(key, item) {
            // Unreachable with a validated key; keep the item rather than drop it.
            tracing::error!(error = %e, "tier vanished during move; returning image to pool");
            self.unranked.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{assert_each_once, board_with_pool, ids, item};

    #[test]
    fn promote_in_ranking_mode_appends_in_click_order() {
        let mut board = board_with_pool(&["a", "b", "c"]);
        for id in ["b", "a", "c"] {
            board.promote(&id.into()).unwrap();
        }
        assert_eq!(ids(board.ranked()), vec!["b", "a", "c"]);
        assert!(board.unranked().is_empty());
    }

    #[test]
    fn promote_in_tier_mode_goes_to_first_tier() {
        let mut board = board_with_pool(&["a"]);
        board.set_mode(ViewMode::Tier);
        let changes = board.promote(&"a".into()).unwrap();
        assert!(changes.unranked && changes.tiers && !changes.ranked);
        assert_eq!(board.locate(&"a".into()), Some(Bucket::Tier("S".into())));
    }

    #[test]
    fn promote_requires_pool_item() {
        let mut board = board_with_pool(&["a"]);
        board.promote(&"a".into()).unwrap();
        assert_eq!(
            board.promote(&"a".into()),
            Err(BoardError::NotInPool("a".into()))
        );
    }

    #[test]
    fn reorder_moves_first_to_last() {
        let mut board = board_with_pool(&["a", "b", "c"]);
        for id in ["a", "b", "c"] {
            board.promote(&id.into()).unwrap();
        }
        board.reorder(0, 2).unwrap();
        assert_eq!(ids(board.ranked()), vec!["b", "c", "a"]);
        board.reorder(2, 0).unwrap();
        assert_eq!(ids(board.ranked()), vec!["a", "b", "c"]);
    }

    #[test]
    fn reorder_same_index_is_noop() {
        let mut board = board_with_pool(&["a", "b"]);
        board.promote(&"a".into()).unwrap();
        board.promote(&"b".into()).unwrap();
        assert!(board.reorder(1, 1).unwrap().is_empty());
        assert_eq!(ids(board.ranked()), vec!["a", "b"]);
    }

    #[test]
    fn reorder_out_of_range_changes_nothing() {
        let mut board = board_with_pool(&["a", "b"]);
        board.promote(&"a".into()).unwrap();
        board.promote(&"b".into()).unwrap();
        assert_eq!(
            board.reorder(0, 2),
            Err(BoardError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(ids(board.ranked()), vec!["a", "b"]);
    }

    #[test]
    fn demote_from_ranked_and_from_tier() {
        let mut board = board_with_pool(&["a", "b"]);
        board.promote(&"a".into()).unwrap();
        board
            .move_from_unranked(&"b".into(), &"C".into())
            .unwrap();

        board.demote(&"a".into()).unwrap();
        board.demote(&"b".into()).unwrap();
        assert_eq!(ids(board.unranked()), vec!["a", "b"]);
        assert!(board.ranked().is_empty());
        assert_eq!(board.tiers().items().count(), 0);
        assert_eq!(
            board.demote(&"a".into()),
            Err(BoardError::NotPlaced("a".into()))
        );
    }

    #[test]
    fn move_from_unranked_to_unknown_tier_keeps_item() {
        let mut board = board_with_pool(&["a"]);
        let err = board.move_from_unranked(&"a".into(), &"Z".into()).unwrap_err();
        assert!(matches!(err, BoardError::Tier(TierError::UnknownTier(_))));
        assert_eq!(ids(board.unranked()), vec!["a"]);
    }

    #[test]
    fn remove_tier_returns_items_to_pool() {
        let mut board = board_with_pool(&["a", "b", "c"]);
        board.move_from_unranked(&"a".into(), &"B".into()).unwrap();
        board.move_from_unranked(&"b".into(), &"B".into()).unwrap();

        let changes = board.remove_tier(&"B".into()).unwrap();
        assert!(changes.tiers && changes.unranked);
        assert_eq!(ids(board.unranked()), vec!["c", "a", "b"]);
        assert!(board.tiers().get(&"B".into()).is_none());
    }

    #[test]
    fn remove_tier_at_minimum_is_rejected() {
        let mut board = board_with_pool(&["a"]);
        for key in ["S", "A", "B"] {
            board.remove_tier(&key.into()).unwrap();
        }
        board.move_from_unranked(&"a".into(), &"C".into()).unwrap();
        let before_pool = ids(board.unranked()).len();

        let err = board.remove_tier(&"C".into()).unwrap_err();
        assert_eq!(err, BoardError::Tier(TierError::MinimumTiers { min: 2 }));
        assert_eq!(board.tiers().len(), 2);
        assert_eq!(ids(board.unranked()).len(), before_pool);
        assert_eq!(board.locate(&"a".into()), Some(Bucket::Tier("C".into())));
    }

    #[test]
    fn every_item_stays_in_exactly_one_bucket() {
        let mut board = board_with_pool(&["a", "b", "c", "d", "e"]);
        let all = ["a", "b", "c", "d", "e"];

        board.promote(&"a".into()).unwrap();
        board.promote(&"b".into()).unwrap();
        board.set_mode(ViewMode::Tier);
        board.promote(&"c".into()).unwrap();
        board.move_from_unranked(&"d".into(), &"B".into()).unwrap();
        board.move_between_tiers(&"c".into(), &"S".into(), &"B".into()).unwrap();
        board.reorder(0, 1).unwrap();
        board.demote(&"a".into()).unwrap();
        let _ = board.promote(&"a".into());
        board.remove_tier(&"B".into()).unwrap();
        board.move_from_unranked(&"c".into(), &"D".into()).unwrap();
        let _ = board.move_between_tiers(&"zz".into(), &"S".into(), &"A".into());
        let _ = board.reorder(0, 9);

        assert_each_once(&board, &all);
    }

    #[test]
    fn resolve_by_id_name_and_prefix() {
        let mut board = Board::new(&[]);
        board.add_unranked(vec![
            ImageItem {
                id: "1234-aaaa".into(),
                src: "blobs/1.png".into(),
                alt: "cat.png".into(),
            },
            ImageItem {
                id: "1299-bbbb".into(),
                src: "blobs/2.png".into(),
                alt: "dog.png".into(),
            },
        ]);
        assert_eq!(board.resolve("1234-aaaa").unwrap().as_str(), "1234-aaaa");
        assert_eq!(board.resolve("dog.png").unwrap().as_str(), "1299-bbbb");
        assert_eq!(board.resolve("123").unwrap().as_str(), "1234-aaaa");
        assert!(matches!(
            board.resolve("12"),
            Err(BoardError::AmbiguousReference { matches: 2, .. })
        ));
        assert!(matches!(board.resolve("zzz"), Err(BoardError::UnknownItem(_))));
        assert!(matches!(board.resolve(""), Err(BoardError::UnknownItem(_))));
    }

    #[test]
    fn take_and_drain() {
        let mut board = board_with_pool(&["a", "b", "c"]);
        board.promote(&"b".into()).unwrap();
        board.move_from_unranked(&"c".into(), &"A".into()).unwrap();
        board.add_tier();

        let (taken, changes) = board.take(&"b".into()).unwrap();
        assert_eq!(taken, item("b"));
        assert!(changes.ranked);

        let drained = board.drain();
        assert_eq!(ids(&drained), vec!["a", "c"]);
        assert!(board.is_empty());
        assert_eq!(board.tiers().len(), 5);
    }
}
