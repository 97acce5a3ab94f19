//! Saving and restoring board state through a [`KeyValueStore`].
//!
//! ## Slot layout
//!
//! | Slot | JSON |
//! |---|---|
//! | `unranked` | `[ImageItem, ...]` |
//! | `ranked` | `[ImageItem, ...]` |
//! | `tierData` | `{ tierKey: [ImageItem, ...] }` |
//! | `tierConfigs` | `{ tierKey: {"name": .., "color": ..} }` |
//! | `tierOrder` | `[tierKey, ...]` |
//! | `viewMode` | `"ranking"` or `"tier"` |
//!
//! ## Saving
//!
//! [`save`] writes every bucket named in [`Changes`], each serialized in
//! full. The three tier slots are always written together, from the same
//! tier list, so they never disagree about which keys exist.
//!
//! ## Loading
//!
//! [`load`] never fails. Each slot is parsed on its own; a slot that is
//! missing falls back to its default, and a slot that cannot be read or
//! parsed is logged and falls back the same way. The tier slots are then
//! reconciled:
//!
//! - an order that is missing, has duplicates or fewer than two keys is
//!   replaced by the default `S A B C D` order
//! - a key without a config gets its default config (or its key as name and
//!   a palette color)
//! - a key without data starts empty
//! - images stored under keys that are not in the order go to the pool
//!
//! Finally, an image id that appears more than once keeps only its first
//! occurrence (pool, then ranked, then tiers in order).

use crate::board::{Board, Changes};
use crate::color::is_hex_color;
use crate::storage::{KeyValueStore, StorageError};
use crate::tiers::{MIN_TIERS, Tier, TierList};
use crate::types::{ImageId, ImageItem, TierConfig, TierKey, ViewMode};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

pub const SLOT_UNRANKED: &str = "unranked";
pub const SLOT_RANKED: &str = "ranked";
pub const SLOT_TIER_DATA: &str = "tierData";
pub const SLOT_TIER_CONFIGS: &str = "tierConfigs";
pub const SLOT_TIER_ORDER: &str = "tierOrder";
pub const SLOT_VIEW_MODE: &str = "viewMode";

/// Every slot this module writes.
pub const ALL_SLOTS: &[&str] = &[
    SLOT_UNRANKED,
    SLOT_RANKED,
    SLOT_TIER_DATA,
    SLOT_TIER_CONFIGS,
    SLOT_TIER_ORDER,
    SLOT_VIEW_MODE,
];

#[derive(Error, Debug)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write the buckets named in `changes`.
pub fn save(
    store: &mut impl KeyValueStore,
    board: &Board,
    changes: Changes,
) -> Result<(), PersistError> {
    if changes.unranked {
        store.set(SLOT_UNRANKED, &serde_json::to_string(board.unranked())?)?;
    }
    if changes.ranked {
        store.set(SLOT_RANKED, &serde_json::to_string(board.ranked())?)?;
    }
    if changes.tiers {
        let tiers = board.tiers().tiers();
        let data: BTreeMap<&str, &[ImageItem]> = tiers
            .iter()
            .map(|t| (t.key.as_str(), t.items.as_slice()))
            .collect();
        let configs: BTreeMap<&str, &TierConfig> =
            tiers.iter().map(|t| (t.key.as_str(), &t.config)).collect();
        let order: Vec<&TierKey> = tiers.iter().map(|t| &t.key).collect();

        let data = serde_json::to_string(&data)?;
        let configs = serde_json::to_string(&configs)?;
        let order = serde_json::to_string(&order)?;
        store.set(SLOT_TIER_DATA, &data)?;
        store.set(SLOT_TIER_CONFIGS, &configs)?;
        store.set(SLOT_TIER_ORDER, &order)?;
    }
    if changes.mode {
        store.set(SLOT_VIEW_MODE, &serde_json::to_string(&board.mode())?)?;
    }
    debug!(?changes, "saved board state");
    Ok(())
}

/// Remove every slot.
pub fn clear(store: &mut impl KeyValueStore) -> Result<(), PersistError> {
    for slot in ALL_SLOTS {
        store.remove(slot)?;
    }
    Ok(())
}

/// Restore a board, falling back per slot on anything unreadable.
pub fn load(store: &impl KeyValueStore, palette: &[String]) -> Board {
    let unranked: Vec<ImageItem> = read_slot(store, SLOT_UNRANKED).unwrap_or_default();
    let ranked: Vec<ImageItem> = read_slot(store, SLOT_RANKED).unwrap_or_default();
    let order: Option<Vec<TierKey>> = read_slot(store, SLOT_TIER_ORDER);
    let configs: HashMap<TierKey, TierConfig> =
        read_slot(store, SLOT_TIER_CONFIGS).unwrap_or_default();
    let data: HashMap<TierKey, Vec<ImageItem>> =
        read_slot(store, SLOT_TIER_DATA).unwrap_or_default();
    let mode: ViewMode = read_slot(store, SLOT_VIEW_MODE).unwrap_or_default();

    let (tiers, orphans) = assemble_tiers(order, configs, data, palette);

    let mut seen = HashSet::new();
    let mut unranked = dedupe(unranked, &mut seen);
    let ranked = dedupe(ranked, &mut seen);
    let tiers: Vec<Tier> = tiers
        .into_iter()
        .map(|mut tier| {
            tier.items = dedupe(std::mem::take(&mut tier.items), &mut seen);
            tier
        })
        .collect();
    unranked.extend(dedupe(orphans, &mut seen));

    let tiers = TierList::from_tiers(tiers, palette).unwrap_or_else(|e| {
        // assemble_tiers only yields valid lists
        warn!(error = %e, "restored tier list invalid; using defaults");
        TierList::with_defaults(palette)
    });
    Board::from_parts(unranked, ranked, tiers, mode)
}

/// Parse one slot. `None` if it is empty or unusable.
fn read_slot<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let json = match store.get(key) {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(e) => {
            warn!(slot = key, error = %e, "could not read slot; using default");
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(slot = key, error = %e, "could not parse slot; using default");
            None
        }
    }
}

/// Rebuild the tier records from the three tier slots. Returns the tiers in
/// order plus images whose tier no longer exists.
fn assemble_tiers(
    order: Option<Vec<TierKey>>,
    mut configs: HashMap<TierKey, TierConfig>,
    mut data: HashMap<TierKey, Vec<ImageItem>>,
    palette: &[String],
) -> (Vec<Tier>, Vec<ImageItem>) {
    let defaults = TierList::with_defaults(palette);
    let order = match order {
        Some(order) if is_usable_order(&order) => order,
        Some(order) => {
            warn!(?order, "tier order unusable; restoring default tiers");
            default_order(&defaults)
        }
        None => default_order(&defaults),
    };

    let tiers = order
        .into_iter()
        .enumerate()
        .map(|(i, key)| {
            let config = match configs.remove(&key) {
                Some(config) if !config.name.trim().is_empty() && is_hex_color(&config.color) => {
                    config
                }
                stored => {
                    if stored.is_some() {
                        warn!(tier = %key, "tier config invalid; using default");
                    }
                    default_config(&defaults, &key, i)
                }
            };
            let items = data.remove(&key).unwrap_or_default();
            Tier { key, config, items }
        })
        .collect();

    let mut orphans = Vec::new();
    let mut stray: Vec<(TierKey, Vec<ImageItem>)> = data.into_iter().collect();
    stray.sort_by(|a, b| a.0.cmp(&b.0));
    for (key, items) in stray {
        if !items.is_empty() {
            warn!(tier = %key, count = items.len(), "images held by unknown tier moved to pool");
        }
        orphans.extend(items);
    }
    (tiers, orphans)
}

fn is_usable_order(order: &[TierKey]) -> bool {
    let unique: HashSet<&TierKey> = order.iter().collect();
    order.len() >= MIN_TIERS && unique.len() == order.len()
}

fn default_order(defaults: &TierList) -> Vec<TierKey> {
    defaults.tiers().iter().map(|t| t.key.clone()).collect()
}

fn default_config(defaults: &TierList, key: &TierKey, index: usize) -> TierConfig {
    match defaults.get(key) {
        Some(tier) => tier.config.clone(),
        None => TierConfig::new(key.as_str(), defaults.palette_color(index)),
    }
}

fn dedupe(items: Vec<ImageItem>, seen: &mut HashSet<ImageId>) -> Vec<ImageItem> {
    items
        .into_iter()
        .filter(|item| {
            let fresh = seen.insert(item.id.clone());
            if !fresh {
                warn!(id = %item.id, "dropping duplicate image entry");
            }
            fresh
        })
        .collect()
}
