//! Text for rank badges and tier labels.
//!
//! Glyphs come from an embedded DejaVu Sans Bold, rasterized by `ab_glyph`
//! and composited with `imageproc`. Any Unicode the font covers (Latin,
//! Greek, Cyrillic and more) is drawn as written. Characters it lacks draw
//! as the font's missing-glyph box.

use super::layout::Rect;
use ab_glyph::{Font, FontRef, InvalidFont, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

const FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Text is never shrunk below this pixel size; past it, it is cut short.
pub const MIN_PX: u32 = 8;

pub fn load_font() -> Result<FontRef<'static>, InvalidFont> {
    FontRef::try_from_slice(FONT_BYTES)
}

/// Pixel size of `text` set at `px`: advance width by line height.
pub fn text_size(font: &impl Font, text: &str, px: u32) -> (u32, u32) {
    if text.is_empty() {
        return (0, 0);
    }
    let scale = PxScale::from(px as f32);
    let (width, _) = imageproc::drawing::text_size(scale, font, text);
    let height = font.as_scaled(scale).height().ceil() as u32;
    (width, height)
}

/// Largest pixel size in `MIN_PX..=max_px` at which `text` fits in
/// `width` x `height`.
pub fn fit_px(font: &impl Font, text: &str, width: u32, height: u32, max_px: u32) -> Option<u32> {
    (MIN_PX..=max_px.max(MIN_PX)).rev().find(|&px| {
        let (w, h) = text_size(font, text, px);
        w <= width && h <= height
    })
}

/// Longest prefix of `text` that fits in `width` at `px`.
pub fn truncate_to_width<'a>(font: &impl Font, text: &'a str, width: u32, px: u32) -> &'a str {
    let mut end = 0;
    for (i, c) in text.char_indices() {
        let next = i + c.len_utf8();
        if text_size(font, &text[..next], px).0 > width {
            break;
        }
        end = next;
    }
    &text[..end]
}

/// Draw `text` at `px`, centered in `area`. Ink outside the canvas is
/// clipped.
pub fn draw_centered(
    canvas: &mut RgbaImage,
    font: &impl Font,
    text: &str,
    area: Rect,
    px: u32,
    color: Rgba<u8>,
) {
    let (w, h) = text_size(font, text, px);
    let at = area.center(w, h);
    draw_text_mut(
        canvas,
        color,
        at.x as i32,
        at.y as i32,
        PxScale::from(px as f32),
        font,
        text,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn drawn(font: &impl Font, text: &str) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(80, 32, PAPER);
        draw_centered(&mut canvas, font, text, Rect::new(0, 0, 80, 32), 20, INK);
        canvas
    }

    fn inked(canvas: &RgbaImage) -> usize {
        canvas.pixels().filter(|p| **p != PAPER).count()
    }

    #[test]
    fn embedded_font_covers_accents_and_greek() {
        let font = load_font().unwrap();
        for c in ['A', '1', 'É', 'ß', 'Ω', 'Ж'] {
            assert_ne!(font.glyph_id(c).0, 0, "{c} has no glyph");
        }
    }

    #[test]
    fn text_size_grows_with_text_and_px() {
        let font = load_font().unwrap();
        assert_eq!(text_size(&font, "", 20), (0, 0));
        let (one, h) = text_size(&font, "A", 20);
        let (two, _) = text_size(&font, "AA", 20);
        assert!(one > 0 && two > one);
        let (_, taller) = text_size(&font, "A", 40);
        assert!(taller > h);
    }

    #[test]
    fn fit_px_picks_largest_that_fits() {
        let font = load_font().unwrap();
        let px = fit_px(&font, "S", 200, 200, 30).unwrap();
        assert_eq!(px, 30);

        let (w, h) = text_size(&font, "Legendary", 20);
        let px = fit_px(&font, "Legendary", w, h, 40).unwrap();
        assert!((20..40).contains(&px));

        assert_eq!(fit_px(&font, "Legendary", 4, 4, 40), None);
    }

    #[test]
    fn truncate_keeps_fitting_prefix() {
        let font = load_font().unwrap();
        let (w, _) = text_size(&font, "ABC", 12);
        assert_eq!(truncate_to_width(&font, "ABCDEFG", w, 12), "ABC");
        assert_eq!(truncate_to_width(&font, "AB", 1000, 12), "AB");
        assert_eq!(truncate_to_width(&font, "ÉÉÉ", 1, 12), "");
    }

    #[test]
    fn centered_text_inks_inside_area() {
        let font = load_font().unwrap();
        let canvas = drawn(&font, "S");
        assert!(inked(&canvas) > 0);
        // Margins around a single letter stay blank.
        assert_eq!(canvas.get_pixel(0, 0), &PAPER);
        assert_eq!(canvas.get_pixel(79, 31), &PAPER);
    }

    #[test]
    fn different_non_ascii_text_draws_differently() {
        let font = load_font().unwrap();
        let accented = drawn(&font, "ÉÉ");
        let greek = drawn(&font, "ΩΩ");
        let question = drawn(&font, "??");
        assert_ne!(accented, greek);
        assert_ne!(accented, question);
        assert_ne!(greek, question);
    }

    #[test]
    fn clips_at_canvas_edge() {
        let font = load_font().unwrap();
        let mut canvas = RgbaImage::from_pixel(20, 48, PAPER);
        draw_centered(&mut canvas, &font, "WWWW", Rect::new(0, 0, 20, 48), 40, INK);
        assert_eq!(canvas.dimensions(), (20, 48));
        assert!(inked(&canvas) > 0);
    }
}
