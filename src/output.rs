//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every image is shown by its position and file name, with a short id in
//! brackets as the handle to pass back to other commands (any unique id
//! prefix works):
//!
//! ```text
//! Mode: tier
//!
//! Ranked (2)
//!  1st cat.png [3f2a9c1e]
//!  2nd dog.png [9ab12c34]
//!
//! Tiers
//! S #ef4444 (1 image)
//!     001 owl.png [c0ffee12]
//! A #f97316 (empty)
//!
//! Unranked (1)
//! 001 bird.png [77aa00bb]
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::board::Board;
use crate::tiers::Tier;
use crate::types::{ImageId, ImageItem, rank_suffix};
use std::path::Path;

/// Characters of an id shown in listings.
const SHORT_ID_LEN: usize = 8;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Leading characters of an id, enough to reference it.
pub fn short_id(id: &ImageId) -> &str {
    let s = id.as_str();
    match s.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// `cat.png [3f2a9c1e]`
fn image_label(item: &ImageItem) -> String {
    format!("{} [{}]", item.alt, short_id(&item.id))
}

fn count_label(n: usize) -> String {
    match n {
        0 => "empty".to_string(),
        1 => "1 image".to_string(),
        n => format!("{n} images"),
    }
}

// ============================================================================
// Board listing
// ============================================================================

/// Format the ranked sequence with ordinal positions.
pub fn format_ranked(items: &[ImageItem]) -> Vec<String> {
    let mut lines = vec![format!("Ranked ({})", items.len())];
    for (i, item) in items.iter().enumerate() {
        let rank = i + 1;
        let ordinal = format!("{rank}{}", rank_suffix(rank));
        lines.push(format!("{ordinal:>4} {}", image_label(item)));
    }
    lines
}

/// Format tiers in display order, each followed by its images.
pub fn format_tiers(tiers: &[Tier]) -> Vec<String> {
    let mut lines = vec!["Tiers".to_string()];
    let width = tiers
        .iter()
        .map(|t| t.config.name.chars().count())
        .max()
        .unwrap_or(0);
    for tier in tiers {
        let mut header = format!(
            "{:<width$} {} ({})",
            tier.config.name,
            tier.config.color,
            count_label(tier.items.len())
        );
        if tier.key.as_str() != tier.config.name {
            header.push_str(&format!(" key: {}", tier.key));
        }
        lines.push(header);
        for (i, item) in tier.items.iter().enumerate() {
            lines.push(format!("{}{} {}", indent(1), format_index(i + 1), image_label(item)));
        }
    }
    lines
}

/// Format the unranked pool.
pub fn format_unranked(items: &[ImageItem]) -> Vec<String> {
    let mut lines = vec![format!("Unranked ({})", items.len())];
    for (i, item) in items.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), image_label(item)));
    }
    lines
}

/// Format the whole board: mode, ranked sequence, tiers, then the pool.
pub fn format_board(board: &Board) -> Vec<String> {
    let mut lines = vec![format!("Mode: {}", board.mode()), String::new()];
    lines.extend(format_ranked(board.ranked()));
    lines.push(String::new());
    lines.extend(format_tiers(board.tiers().tiers()));
    lines.push(String::new());
    lines.extend(format_unranked(board.unranked()));
    lines
}

pub fn print_board(board: &Board) {
    for line in format_board(board) {
        println!("{}", line);
    }
}

// ============================================================================
// Command results
// ============================================================================

/// Format the result of adding images: a count, then each new item.
pub fn format_added(board: &Board, added: &[ImageId]) -> Vec<String> {
    let mut lines = vec![format!("Added {}", count_label(added.len()))];
    if added.is_empty() {
        lines[0] = "Added no images".to_string();
    }
    for (i, item) in board
        .items()
        .filter(|item| added.contains(&item.id))
        .enumerate()
    {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), image_label(item)));
    }
    lines
}

pub fn print_added(board: &Board, added: &[ImageId]) {
    for line in format_added(board, added) {
        println!("{}", line);
    }
}

/// `Exported ranking → out/my-ranking.png (640x360)`
pub fn format_exported(board: &Board, path: &Path, size: Option<(u32, u32)>) -> String {
    let mut line = format!("Exported {} → {}", board.mode(), path.display());
    if let Some((w, h)) = size {
        line.push_str(&format!(" ({w}x{h})"));
    }
    line
}
