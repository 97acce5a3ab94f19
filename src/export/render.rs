//! Rasterizing a board into an RGBA canvas.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, GIF, WebP, TIFF, BMP) | `image::ImageReader` with guessed format |
//! | Cell crop | `image::DynamicImage::resize_to_fill` (`Lanczos3`) |
//! | Compositing | `image::imageops::overlay` |
//! | Filled blocks | `imageproc::drawing::draw_filled_rect_mut` |
//! | Parallel decode | `rayon` `par_iter`, one task per tile |
//! | Text | [`super::text`]: `ab_glyph` with an embedded font |
//!
//! Only the visible view is drawn: the ranked grid in ranking mode, the
//! tier bands in tier mode. The unranked pool never appears.

use super::ExportError;
use super::layout::{Metrics, Rect, badge_rect, ranking_layout, tier_layout};
use super::text::{MIN_PX, draw_centered, fit_px, load_font, text_size, truncate_to_width};
use crate::blobs::BlobStore;
use crate::board::Board;
use crate::color::{ColorError, parse_hex};
use crate::config::{Background, RankerConfig};
use crate::tiers::TierList;
use crate::types::{ImageItem, ViewMode, rank_suffix};
use ab_glyph::FontRef;
use image::imageops::{self, FilterType};
use image::{ImageReader, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use rayon::prelude::*;
use std::path::Path;
use tracing::debug;

/// Theme colors, parsed once per render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgba<u8>,
    pub text: Rgba<u8>,
    pub cell: Rgba<u8>,
    pub badge: Rgba<u8>,
    pub badge_text: Rgba<u8>,
    pub label_text: Rgba<u8>,
}

impl Palette {
    pub fn from_config(config: &RankerConfig) -> Result<Self, ColorError> {
        let theme = &config.theme;
        let background = match &config.export.background {
            Background::Theme => parse_hex(&theme.background)?,
            Background::Fixed(color) => parse_hex(color)?,
        };
        Ok(Self {
            background,
            text: parse_hex(&theme.text)?,
            cell: parse_hex(&theme.cell)?,
            badge: parse_hex(&theme.badge)?,
            badge_text: parse_hex(&theme.badge_text)?,
            label_text: parse_hex(&theme.label_text)?,
        })
    }
}

/// Font and colors shared by every drawing call of one render.
struct Pen<'a> {
    font: &'a FontRef<'static>,
    palette: &'a Palette,
}

/// Draw the board's current view.
pub fn render(
    board: &Board,
    blobs: &BlobStore,
    config: &RankerConfig,
) -> Result<RgbaImage, ExportError> {
    let metrics = Metrics::from_config(&config.export);
    let palette = Palette::from_config(config)?;
    let font = load_font()?;
    let pen = Pen {
        font: &font,
        palette: &palette,
    };
    match board.mode() {
        ViewMode::Ranking => render_ranking(board.ranked(), blobs, &metrics, &pen),
        ViewMode::Tier => render_tiers(board.tiers(), blobs, &metrics, &pen),
    }
}

fn render_ranking(
    ranked: &[ImageItem],
    blobs: &BlobStore,
    m: &Metrics,
    pen: &Pen,
) -> Result<RgbaImage, ExportError> {
    let palette = pen.palette;
    let layout = ranking_layout(ranked.len(), m);
    let items: Vec<&ImageItem> = ranked.iter().collect();
    let tiles = decode_tiles(&items, (m.cell, m.cell), blobs)?;

    let mut canvas = RgbaImage::from_pixel(layout.width, layout.height, palette.background);
    if ranked.is_empty() {
        let area = Rect::new(0, 0, layout.width, layout.height);
        draw_fitted(&mut canvas, pen, "No images ranked", area, m.padding, 16 * m.scale, palette.text);
        return Ok(canvas);
    }

    for (rank, (cell, tile)) in layout.cells.iter().zip(&tiles).enumerate() {
        fill_rect(&mut canvas, *cell, palette.cell);
        imageops::overlay(&mut canvas, tile, cell.x as i64, cell.y as i64);

        let n = rank + 1;
        let label = format!("{n}{}", rank_suffix(n)).to_uppercase();
        let px = fit_px(pen.font, &label, cell.width / 2, cell.height / 4, 14 * m.scale)
            .unwrap_or(MIN_PX);
        let badge = badge_rect(*cell, text_size(pen.font, &label, px), m);
        fill_rect(&mut canvas, badge, palette.badge);
        draw_centered(&mut canvas, pen.font, &label, badge, px, palette.badge_text);
    }
    debug!(images = ranked.len(), "rendered ranking view");
    Ok(canvas)
}

fn render_tiers(
    tiers: &TierList,
    blobs: &BlobStore,
    m: &Metrics,
    pen: &Pen,
) -> Result<RgbaImage, ExportError> {
    let palette = pen.palette;
    let counts: Vec<usize> = tiers.tiers().iter().map(|t| t.items.len()).collect();
    let layout = tier_layout(&counts, m);
    let items: Vec<&ImageItem> = tiers.items().collect();
    let mut tiles = decode_tiles(&items, m.tier_cell, blobs)?.into_iter();

    let mut canvas = RgbaImage::from_pixel(layout.width, layout.height, palette.background);
    for (tier, band) in tiers.tiers().iter().zip(&layout.bands) {
        fill_rect(&mut canvas, band.label, parse_hex(&tier.config.color)?);
        fill_rect(&mut canvas, band.content, palette.cell);

        let name = tier.config.name.trim();
        draw_fitted(&mut canvas, pen, name, band.label, 4 * m.scale, 24 * m.scale, palette.label_text);

        for (cell, tile) in band.cells.iter().zip(tiles.by_ref()) {
            imageops::overlay(&mut canvas, &tile, cell.x as i64, cell.y as i64);
        }
    }
    debug!(tiers = tiers.len(), images = items.len(), "rendered tier view");
    Ok(canvas)
}

/// Decode and crop every item's blob to `size`, in parallel. Order matches
/// `items`; the first failure aborts the export.
fn decode_tiles(
    items: &[&ImageItem],
    size: (u32, u32),
    blobs: &BlobStore,
) -> Result<Vec<RgbaImage>, ExportError> {
    items
        .par_iter()
        .map(|item| load_tile(&blobs.resolve(item), size))
        .collect()
}

fn load_tile(path: &Path, (width, height): (u32, u32)) -> Result<RgbaImage, ExportError> {
    let decode = || -> Result<image::DynamicImage, image::ImageError> {
        Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
    };
    let img = decode().map_err(|source| ExportError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img
        .resize_to_fill(width, height, FilterType::Lanczos3)
        .to_rgba8())
}

/// Fill `rect`, clipped to the canvas.
fn fill_rect(canvas: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let area = imageproc::rect::Rect::at(rect.x as i32, rect.y as i32).of_size(rect.width, rect.height);
    draw_filled_rect_mut(canvas, area, color);
}

/// Draw `text` centered in `area` less `margin`, as large as fits up to
/// `max_px`. Text too long even at [`MIN_PX`] is cut short.
fn draw_fitted(
    canvas: &mut RgbaImage,
    pen: &Pen,
    text: &str,
    area: Rect,
    margin: u32,
    max_px: u32,
    color: Rgba<u8>,
) {
    let room_w = area.width.saturating_sub(2 * margin);
    let room_h = area.height.saturating_sub(2 * margin);
    match fit_px(pen.font, text, room_w, room_h, max_px) {
        Some(px) => draw_centered(canvas, pen.font, text, area, px, color),
        None => {
            let cut = truncate_to_width(pen.font, text, room_w, MIN_PX);
            draw_centered(canvas, pen.font, cut, area, MIN_PX, color);
        }
    }
}
