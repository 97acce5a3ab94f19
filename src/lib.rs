//! # Image Ranker
//!
//! Rank a pile of images, either as one ordered list or as a tier list
//! (`S A B C D` and any tiers you add), and export the result as a PNG.
//! State lives in a workspace directory and survives between runs.
//!
//! # Architecture: Board, Session, Export
//!
//! ```text
//! files ──intake──▶ pool ──promote/move──▶ ranked | tiers ──export──▶ my-ranking.png
//!                     ▲                          │
//!                     └───────── demote ─────────┘
//! ```
//!
//! - The **board** is pure in-memory state. Every item sits in exactly one
//!   bucket (the pool, the ranked sequence, or one tier) and every mutation
//!   reports which buckets it touched.
//! - The **session** wraps a board with its workspace: staged blobs, slot
//!   storage and config. It persists exactly the touched buckets after each
//!   operation.
//! - **Export** draws the current view (never the pool) into an in-memory
//!   raster and writes it only when complete.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `ImageItem`, ids, tier config, view mode |
//! | [`intake`] | Classifies input paths and stages accepted images |
//! | [`blobs`] | Staged copies behind `ImageItem::src`; acquire and consuming release |
//! | [`tiers`] | Ordered tier records: add, remove, rename, recolor, move |
//! | [`board`] | The three buckets and every move between them |
//! | [`interaction`] | Drag and tier-name edit sessions |
//! | [`storage`] | Key-value slot store (files or memory) |
//! | [`persist`] | Slot layout, save of touched buckets, tolerant load |
//! | [`session`] | One open workspace; every operation plus persistence |
//! | [`export`] | PNG rendering of the ranking grid or tier list |
//! | [`config`] | `config.toml` loading, validation, merging |
//! | [`color`] | `#rgb` / `#rrggbb` parsing |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Items Are Moved, Never Copied
//!
//! `ImageItem` does not implement `Clone`. Moving an item between buckets
//! removes it by value from one `Vec` and pushes it into another, so the
//! one-bucket invariant is enforced by ownership rather than checked after
//! the fact. Releasing a blob consumes the item, so a blob cannot be
//! released twice.
//!
//! ## One Record Per Tier
//!
//! A tier's key, name, color and images are one value in an ordered list.
//! The persisted form still splits them into `tierOrder`, `tierConfigs` and
//! `tierData` slots, always written together; loading reconciles any
//! disagreement between them instead of failing.
//!
//! ## Nothing Fatal On Load
//!
//! A missing or corrupt slot falls back to that bucket's default and is
//! logged. Opening a workspace never fails because of its saved state.

pub mod blobs;
pub mod board;
pub mod color;
pub mod config;
pub mod export;
pub mod intake;
pub mod interaction;
pub mod output;
pub mod persist;
pub mod session;
pub mod storage;
pub mod tiers;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
