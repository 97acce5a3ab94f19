//! Pure geometry for the exported view.
//!
//! All functions here are pure and testable without any I/O or images.
//! Lengths from [`ExportConfig`] are layout units; [`Metrics`] multiplies
//! them by the pixel ratio once, so everything downstream is in pixels.
//!
//! ## Ranking view
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ pad                                  │
//! │  ┌────┐ gap ┌────┐     ┌────┐        │
//! │  │1ST │     │2ND │ ... │5TH │        │
//! │  └────┘     └────┘     └────┘        │
//! │   gap                                │
//! │  ┌────┐                              │
//! │  │6TH │                              │
//! │  └────┘                          pad │
//! └──────────────────────────────────────┘
//! ```
//!
//! ## Tier view
//!
//! ```text
//! ┌───────┬──────────────────────────────┐
//! │   S   │ ┌──┐┌──┐┌──┐                 │  one band per tier, wrapping
//! │       │ └──┘└──┘└──┘                 │  after `tier_columns` cells
//! ├───────┼──────────────────────────────┤
//! │   A   │                              │  empty tiers keep one row
//! └───────┴──────────────────────────────┘
//! ```

use crate::config::ExportConfig;

/// Width of a tier's label block, in layout units.
pub const LABEL_WIDTH: u32 = 96;

/// Gutter between and around tier cells, in layout units.
pub const TIER_CELL_GAP: u32 = 4;

/// Inset of a rank badge from its cell's corner, in layout units.
pub const BADGE_INSET: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Place a `width` x `height` box in the middle of this one.
    pub fn center(&self, width: u32, height: u32) -> Rect {
        Rect::new(
            self.x + self.width.saturating_sub(width) / 2,
            self.y + self.height.saturating_sub(height) / 2,
            width,
            height,
        )
    }
}

/// Export lengths resolved to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub scale: u32,
    pub padding: u32,
    pub gap: u32,
    pub columns: u32,
    pub cell: u32,
    pub tier_columns: u32,
    pub tier_cell: (u32, u32),
    pub tier_gap: u32,
    pub label_width: u32,
}

impl Metrics {
    pub fn from_config(config: &ExportConfig) -> Self {
        let s = config.pixel_ratio.max(1);
        let (rw, rh) = config.aspect_ratio.ratio();
        let tier_h = config.tier_cell_height * s;
        let tier_w = (tier_h as f64 * rw as f64 / rh as f64).round() as u32;
        Self {
            scale: s,
            padding: config.padding * s,
            gap: config.gap * s,
            columns: config.columns.max(1),
            cell: config.cell_size * s,
            tier_columns: config.tier_columns.max(1),
            tier_cell: (tier_w, tier_h),
            tier_gap: TIER_CELL_GAP * s,
            label_width: LABEL_WIDTH * s,
        }
    }
}

/// Number of rows needed for `count` cells, never less than one.
pub fn row_count(count: usize, columns: u32) -> u32 {
    (count as u32).div_ceil(columns.max(1)).max(1)
}

/// Laid-out ranking grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingLayout {
    pub width: u32,
    pub height: u32,
    /// One square cell per ranked image, in rank order.
    pub cells: Vec<Rect>,
}

/// Lay out `count` ranked images. The canvas is always `columns` wide and
/// at least one row tall.
pub fn ranking_layout(count: usize, m: &Metrics) -> RankingLayout {
    let rows = row_count(count, m.columns);
    let step = m.cell + m.gap;
    let width = 2 * m.padding + m.columns * m.cell + (m.columns - 1) * m.gap;
    let height = 2 * m.padding + rows * m.cell + (rows - 1) * m.gap;
    let cells = (0..count as u32)
        .map(|i| {
            let (row, col) = (i / m.columns, i % m.columns);
            Rect::new(m.padding + col * step, m.padding + row * step, m.cell, m.cell)
        })
        .collect();
    RankingLayout {
        width,
        height,
        cells,
    }
}

/// One tier's band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierBand {
    /// Colored block holding the tier name.
    pub label: Rect,
    /// Area holding the tier's images.
    pub content: Rect,
    pub cells: Vec<Rect>,
}

/// Laid-out tier list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierLayout {
    pub width: u32,
    pub height: u32,
    pub bands: Vec<TierBand>,
}

/// Lay out tiers holding `counts[i]` images each, top to bottom.
pub fn tier_layout(counts: &[usize], m: &Metrics) -> TierLayout {
    let (cell_w, cell_h) = m.tier_cell;
    let content_w = m.tier_columns * cell_w + (m.tier_columns + 1) * m.tier_gap;
    let width = 2 * m.padding + m.label_width + content_w;

    let mut y = m.padding;
    let mut bands = Vec::with_capacity(counts.len());
    for &count in counts {
        let rows = row_count(count, m.tier_columns);
        let band_h = rows * cell_h + (rows + 1) * m.tier_gap;
        let label = Rect::new(m.padding, y, m.label_width, band_h);
        let content = Rect::new(label.right(), y, content_w, band_h);
        let cells = (0..count as u32)
            .map(|i| {
                let (row, col) = (i / m.tier_columns, i % m.tier_columns);
                Rect::new(
                    content.x + m.tier_gap + col * (cell_w + m.tier_gap),
                    content.y + m.tier_gap + row * (cell_h + m.tier_gap),
                    cell_w,
                    cell_h,
                )
            })
            .collect();
        bands.push(TierBand {
            label,
            content,
            cells,
        });
        y += band_h + m.gap;
    }

    let height = match bands.last() {
        Some(last) => last.content.bottom() + m.padding,
        None => 2 * m.padding,
    };
    TierLayout {
        width,
        height,
        bands,
    }
}

/// Rank badge in the top-left corner of `cell`, sized around text of
/// `text` pixels.
pub fn badge_rect(cell: Rect, text: (u32, u32), m: &Metrics) -> Rect {
    let inset = BADGE_INSET * m.scale;
    let pad = 2 * m.scale;
    Rect::new(
        cell.x + inset,
        cell.y + inset,
        (text.0 + 2 * pad).min(cell.width.saturating_sub(inset)),
        (text.1 + 2 * pad).min(cell.height.saturating_sub(inset)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AspectRatio;

    fn metrics(ratio: u32) -> Metrics {
        Metrics::from_config(&ExportConfig {
            pixel_ratio: ratio,
            columns: 3,
            cell_size: 100,
            tier_columns: 4,
            tier_cell_height: 50,
            padding: 10,
            gap: 5,
            ..ExportConfig::default()
        })
    }

    #[test]
    fn metrics_scale_by_pixel_ratio() {
        let m = metrics(2);
        assert_eq!(m.cell, 200);
        assert_eq!(m.padding, 20);
        assert_eq!(m.tier_cell, (100, 100));
        assert_eq!(m.label_width, LABEL_WIDTH * 2);
    }

    #[test]
    fn tier_cells_follow_aspect_ratio() {
        let config = |aspect_ratio| ExportConfig {
            pixel_ratio: 1,
            tier_cell_height: 90,
            aspect_ratio,
            ..ExportConfig::default()
        };
        assert_eq!(Metrics::from_config(&config(AspectRatio::Wide)).tier_cell, (160, 90));
        assert_eq!(Metrics::from_config(&config(AspectRatio::Square)).tier_cell, (90, 90));
        assert_eq!(Metrics::from_config(&config(AspectRatio::Vertical)).tier_cell, (68, 90));
    }

    #[test]
    fn row_count_never_zero() {
        assert_eq!(row_count(0, 5), 1);
        assert_eq!(row_count(5, 5), 1);
        assert_eq!(row_count(6, 5), 2);
    }

    // =========================================================================
    // Ranking layout
    // =========================================================================

    #[test]
    fn ranking_grid_wraps_after_columns() {
        let layout = ranking_layout(4, &metrics(1));
        assert_eq!(layout.width, 10 + 3 * 100 + 2 * 5 + 10);
        assert_eq!(layout.height, 10 + 2 * 100 + 5 + 10);
        assert_eq!(layout.cells[0], Rect::new(10, 10, 100, 100));
        assert_eq!(layout.cells[2], Rect::new(220, 10, 100, 100));
        assert_eq!(layout.cells[3], Rect::new(10, 115, 100, 100));
    }

    #[test]
    fn empty_ranking_keeps_one_row() {
        let layout = ranking_layout(0, &metrics(1));
        assert!(layout.cells.is_empty());
        assert_eq!(layout.height, 120);
    }

    #[test]
    fn cells_stay_inside_canvas() {
        let layout = ranking_layout(7, &metrics(2));
        for cell in &layout.cells {
            assert!(cell.right() <= layout.width);
            assert!(cell.bottom() <= layout.height);
        }
    }

    // =========================================================================
    // Tier layout
    // =========================================================================

    #[test]
    fn tier_bands_stack_with_gap() {
        let m = metrics(1);
        let layout = tier_layout(&[2, 0, 5], &m);
        assert_eq!(layout.bands.len(), 3);

        let single = 50 + 2 * 4;
        let double = 2 * 50 + 3 * 4;
        assert_eq!(layout.bands[0].label.height, single);
        assert_eq!(layout.bands[1].label.height, single);
        assert_eq!(layout.bands[2].label.height, double);
        assert_eq!(layout.bands[1].label.y, 10 + single + 5);
        assert_eq!(layout.height, 10 + single * 2 + double + 2 * 5 + 10);
    }

    #[test]
    fn tier_cells_wrap_inside_content() {
        let layout = tier_layout(&[5], &metrics(1));
        let band = &layout.bands[0];
        assert_eq!(band.cells[0], Rect::new(10 + 96 + 4, 14, 50, 50));
        assert_eq!(band.cells[4], Rect::new(10 + 96 + 4, 14 + 54, 50, 50));
        for cell in &band.cells {
            assert!(cell.right() <= band.content.right());
            assert!(cell.bottom() <= band.content.bottom());
        }
        assert_eq!(layout.width, band.content.right() + 10);
    }

    #[test]
    fn badge_hugs_top_left_corner() {
        let m = metrics(1);
        let cell = Rect::new(10, 10, 100, 100);
        assert_eq!(badge_rect(cell, (17, 7), &m), Rect::new(14, 14, 21, 11));
    }

    #[test]
    fn rect_center() {
        let outer = Rect::new(10, 20, 100, 50);
        assert_eq!(outer.center(20, 10), Rect::new(50, 40, 20, 10));
    }
}
