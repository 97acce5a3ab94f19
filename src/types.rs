//! Shared types used across the board, persistence and export layers.
//!
//! These types are serialized to the storage slots and must keep the same
//! JSON shape across versions: an [`ImageItem`] is always
//! `{"id": ..., "src": ..., "alt": ...}` and a [`TierConfig`] is always
//! `{"name": ..., "color": ...}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque unique identifier of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Fresh random identifier (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ImageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque key of a tier. Stable across renames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierKey(String);

impl TierKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TierKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An uploaded image.
///
/// - `id`: unique across the whole board
/// - `src`: locator of the staged blob, relative to the workspace
///   (e.g. `blobs/6f1c….png`). Revocable: see [`crate::blobs`].
/// - `alt`: display label, the original file name
///
/// Not `Clone`. Items move between buckets by value and
/// [`BlobStore::release`](crate::blobs::BlobStore::release) consumes them,
/// so a handle can only be released once.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    pub id: ImageId,
    pub src: String,
    pub alt: String,
}

/// Display settings of a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    pub name: String,
    /// `#rgb` or `#rrggbb`.
    pub color: String,
}

impl TierConfig {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Which view the board is arranged in.
///
/// Decides where [`promote`](crate::board::Board::promote) sends an item
/// and which view [`export`](crate::export) renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Ranking,
    Tier,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Ranking => f.write_str("ranking"),
            ViewMode::Tier => f.write_str("tier"),
        }
    }
}

/// English ordinal suffix for a 1-based rank: `st`, `nd`, `rd` or `th`.
pub fn rank_suffix(rank: usize) -> &'static str {
    if (11..=13).contains(&(rank % 100)) {
        return "th";
    }
    match rank % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}
