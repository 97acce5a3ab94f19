//! Hex color parsing for tier colors, theme colors and export backgrounds.

use image::Rgba;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid color '{0}': expected #rgb or #rrggbb")]
    Invalid(String),
}

/// Parse `#rgb` or `#rrggbb` (case-insensitive) into an opaque RGBA pixel.
pub fn parse_hex(value: &str) -> Result<Rgba<u8>, ColorError> {
    let invalid = || ColorError::Invalid(value.to_string());
    let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = channel(&c.to_string())?;
                rgb[i] = v * 17;
            }
            Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 => Ok(Rgba([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            255,
        ])),
        _ => Err(invalid()),
    }
}

/// True if `value` parses as a hex color.
pub fn is_hex_color(value: &str) -> bool {
    parse_hex(value).is_ok()
}
