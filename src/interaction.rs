//! Short-lived interaction state: drags and tier-name edits.
//!
//! Each session is a single slot owned by whoever drives the interaction
//! (the CLI builds one per command). Terminal events always clear the slot:
//! a drop clears it whether or not the move succeeded, `end` clears it
//! unconditionally, and an edit is cleared by both commit and cancel. A
//! dropped or abandoned gesture therefore never leaves a ghost drag behind.

use crate::board::{Board, BoardError, Changes};
use crate::types::{ImageId, TierKey};

/// Drag within the ranked sequence, tracked by index.
#[derive(Debug, Default)]
pub struct RankingDrag {
    dragged: Option<usize>,
}

impl RankingDrag {
    pub fn start(&mut self, index: usize) {
        self.dragged = Some(index);
    }

    pub fn is_active(&self) -> bool {
        self.dragged.is_some()
    }

    /// Clicks are ignored while something is being dragged.
    pub fn click_allowed(&self) -> bool {
        !self.is_active()
    }

    /// Drop onto ranked position `target`. A drop with no drag in progress
    /// does nothing.
    pub fn drop_on(&mut self, board: &mut Board, target: usize) -> Result<Changes, BoardError> {
        match self.dragged.take() {
            Some(from) => board.reorder(from, target),
            None => Ok(Changes::none()),
        }
    }

    pub fn end(&mut self) {
        self.dragged = None;
    }
}

/// Where a tier-view drag started, or where it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierSlot {
    Unranked,
    Tier(TierKey),
}

/// Drag in the tier view: an item plus the slot it was picked up from.
#[derive(Debug, Default)]
pub struct TierDrag {
    dragged: Option<(ImageId, TierSlot)>,
}

impl TierDrag {
    pub fn start(&mut self, id: ImageId, source: TierSlot) {
        self.dragged = Some((id, source));
    }

    pub fn is_active(&self) -> bool {
        self.dragged.is_some()
    }

    pub fn click_allowed(&self) -> bool {
        !self.is_active()
    }

    /// The item being dragged, if any.
    pub fn dragged(&self) -> Option<&ImageId> {
        self.dragged.as_ref().map(|(id, _)| id)
    }

    /// Drop onto `target`.
    ///
    /// | from \ to | pool | tier |
    /// |---|---|---|
    /// | pool | no-op | `move_from_unranked` |
    /// | tier | `demote` | `move_between_tiers` |
    pub fn drop_on(&mut self, board: &mut Board, target: TierSlot) -> Result<Changes, BoardError> {
        let Some((id, source)) = self.dragged.take() else {
            return Ok(Changes::none());
        };
        match (source, target) {
            (TierSlot::Unranked, TierSlot::Unranked) => Ok(Changes::none()),
            (TierSlot::Unranked, TierSlot::Tier(to)) => board.move_from_unranked(&id, &to),
            (TierSlot::Tier(_), TierSlot::Unranked) => board.demote(&id),
            (TierSlot::Tier(from), TierSlot::Tier(to)) => board.move_between_tiers(&id, &from, &to),
        }
    }

    pub fn end(&mut self) {
        self.dragged = None;
    }
}

/// In-place editing of one tier's name.
#[derive(Debug, Default)]
pub struct TierEditor {
    editing: Option<(TierKey, String)>,
}

impl TierEditor {
    /// Start editing `key`, seeding the draft with its current name.
    pub fn begin(&mut self, board: &Board, key: &TierKey) -> Result<(), BoardError> {
        let tier = board
            .tiers()
            .get(key)
            .ok_or_else(|| crate::tiers::TierError::UnknownTier(key.clone()))?;
        self.editing = Some((key.clone(), tier.config.name.clone()));
        Ok(())
    }

    pub fn editing(&self) -> Option<&TierKey> {
        self.editing.as_ref().map(|(key, _)| key)
    }

    pub fn draft(&self) -> Option<&str> {
        self.editing.as_ref().map(|(_, draft)| draft.as_str())
    }

    pub fn set_draft(&mut self, text: &str) {
        if let Some((_, draft)) = self.editing.as_mut() {
            *draft = text.to_string();
        }
    }

    /// Apply the draft as the tier's new name. A blank draft keeps the old
    /// name. The edit ends either way.
    pub fn commit(&mut self, board: &mut Board) -> Result<Changes, BoardError> {
        match self.editing.take() {
            Some((key, draft)) if !draft.trim().is_empty() => board.rename_tier(&key, &draft),
            _ => Ok(Changes::none()),
        }
    }

    /// Abandon the edit (escape, blur).
    pub fn cancel(&mut self) {
        self.editing = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Bucket;
    use crate::test_helpers::{board_with_pool, ids};

    fn ranked_board(names: &[&str]) -> Board {
        let mut board = board_with_pool(names);
        for id in names {
            board.promote(&(*id).into()).unwrap();
        }
        board
    }

    #[test]
    fn ranking_drop_reorders_and_clears() {
        let mut board = ranked_board(&["a", "b", "c"]);
        let mut drag = RankingDrag::default();
        drag.start(0);
        assert!(!drag.click_allowed());
        drag.drop_on(&mut board, 2).unwrap();
        assert!(!drag.is_active());
        assert_eq!(ids(board.ranked()), vec!["b", "c", "a"]);
    }

    #[test]
    fn ranking_drop_without_drag_is_noop() {
        let mut board = ranked_board(&["a", "b", "c"]);
        let mut drag = RankingDrag::default();
        let changes = drag.drop_on(&mut board, 1).unwrap();
        assert!(changes.is_empty());
        assert_eq!(ids(board.ranked()), vec!["a", "b", "c"]);
    }

    #[test]
    fn ranking_drop_on_same_index_is_noop() {
        let mut board = ranked_board(&["a", "b"]);
        let mut drag = RankingDrag::default();
        drag.start(1);
        assert!(drag.drop_on(&mut board, 1).unwrap().is_empty());
        assert_eq!(ids(board.ranked()), vec!["a", "b"]);
    }

    #[test]
    fn failed_drop_still_clears_drag() {
        let mut board = ranked_board(&["a"]);
        let mut drag = RankingDrag::default();
        drag.start(0);
        assert!(drag.drop_on(&mut board, 5).is_err());
        assert!(!drag.is_active());
    }

    #[test]
    fn drag_end_without_drop_clears() {
        let mut drag = TierDrag::default();
        drag.start("a".into(), TierSlot::Unranked);
        assert_eq!(drag.dragged().map(|i| i.as_str()), Some("a"));
        drag.end();
        assert!(drag.click_allowed());
    }

    #[test]
    fn tier_drag_covers_every_route() {
        let mut board = board_with_pool(&["a"]);
        let mut drag = TierDrag::default();

        drag.start("a".into(), TierSlot::Unranked);
        drag.drop_on(&mut board, TierSlot::Tier("B".into())).unwrap();
        assert_eq!(board.locate(&"a".into()), Some(Bucket::Tier("B".into())));

        drag.start("a".into(), TierSlot::Tier("B".into()));
        drag.drop_on(&mut board, TierSlot::Tier("D".into())).unwrap();
        assert_eq!(board.locate(&"a".into()), Some(Bucket::Tier("D".into())));

        drag.start("a".into(), TierSlot::Tier("D".into()));
        drag.drop_on(&mut board, TierSlot::Unranked).unwrap();
        assert_eq!(board.locate(&"a".into()), Some(Bucket::Unranked));

        drag.start("a".into(), TierSlot::Unranked);
        assert!(drag.drop_on(&mut board, TierSlot::Unranked).unwrap().is_empty());
        assert!(!drag.is_active());
    }

    #[test]
    fn editor_commit_renames() {
        let mut board = board_with_pool(&[]);
        let mut editor = TierEditor::default();
        editor.begin(&board, &"S".into()).unwrap();
        assert_eq!(editor.draft(), Some("S"));
        editor.set_draft("Superb");
        editor.commit(&mut board).unwrap();
        assert!(editor.editing().is_none());
        assert_eq!(board.tiers().get(&"S".into()).unwrap().config.name, "Superb");
    }

    #[test]
    fn editor_blank_commit_and_cancel_keep_name() {
        let mut board = board_with_pool(&[]);
        let mut editor = TierEditor::default();

        editor.begin(&board, &"A".into()).unwrap();
        editor.set_draft("   ");
        assert!(editor.commit(&mut board).unwrap().is_empty());

        editor.begin(&board, &"A".into()).unwrap();
        editor.set_draft("Other");
        editor.cancel();
        assert!(editor.editing().is_none());
        assert_eq!(board.tiers().get(&"A".into()).unwrap().config.name, "A");
    }

    #[test]
    fn editor_rejects_unknown_tier() {
        let board = board_with_pool(&[]);
        let mut editor = TierEditor::default();
        assert!(editor.begin(&board, &"nope".into()).is_err());
        assert!(editor.editing().is_none());
    }
}
