//! Shared test utilities for the image-ranker test suite.
//!
//! Provides item builders, image fixtures written on the fly, and
//! assertions over the bucket-ownership invariant.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut board = board_with_pool(&["a", "b", "c"]);
//! board.promote(&"a".into()).unwrap();
//! assert_eq!(ids(board.ranked()), vec!["a"]);
//! assert_each_once(&board, &["a", "b", "c"]);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::board::Board;
use crate::tiers::TierList;
use crate::types::ImageItem;

// =========================================================================
// Builders
// =========================================================================

/// An item whose id, blob and label all derive from `id`.
pub fn item(id: &str) -> ImageItem {
    ImageItem {
        id: id.into(),
        src: format!("blobs/{id}.png"),
        alt: format!("{id}.png"),
    }
}

/// A fresh board (default tiers, ranking mode) with `ids` in the pool.
pub fn board_with_pool(ids: &[&str]) -> Board {
    let mut board = Board::new(&[]);
    board.add_unranked(ids.iter().map(|id| item(id)).collect());
    board
}

// =========================================================================
// Image fixtures
// =========================================================================

/// Write a solid-color PNG of the given size.
pub fn write_png(path: &Path, width: u32, height: u32) {
    write_solid_png(path, width, height, [200, 40, 40]);
}

pub fn write_solid_png(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image::RgbImage::from_pixel(width, height, image::Rgb(rgb))
        .save(path)
        .unwrap();
}

/// Write `names` as small PNGs into `dir` and return their paths in order.
pub fn write_pngs(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            write_png(&path, 8, 6);
            path
        })
        .collect()
}

// =========================================================================
// Extractors
// =========================================================================

/// Ids of `items` in order.
pub fn ids(items: &[ImageItem]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

/// Tier keys in display order.
pub fn tier_keys(list: &TierList) -> Vec<&str> {
    list.tiers().iter().map(|t| t.key.as_str()).collect()
}

// =========================================================================
// Invariant assertions
// =========================================================================

/// Assert that the board holds exactly `expected`, each in one bucket.
pub fn assert_each_once(board: &Board, expected: &[&str]) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for item in board.items() {
        *seen.entry(item.id.as_str()).or_default() += 1;
    }
    for (id, count) in &seen {
        assert_eq!(*count, 1, "image '{id}' appears {count} times");
    }
    let mut actual: Vec<&str> = seen.keys().copied().collect();
    actual.sort();
    let mut expected = expected.to_vec();
    expected.sort();
    assert_eq!(actual, expected, "board contents mismatch");
}
