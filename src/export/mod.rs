//! PNG export of the current view.
//!
//! The board is drawn into an in-memory RGBA canvas first; only a complete
//! raster is encoded and written, as `<dir>/<filename>.png`. Any failure
//! (an unreadable or undecodable blob, an encode or write error) is
//! returned to the caller and leaves no file behind.
//!
//! ## Architecture
//!
//! ```text
//! layout.rs   pure geometry: canvas size, cell and band rects
//! text.rs     badge and label text: embedded font, ab_glyph, imageproc
//! render.rs   decode tiles (rayon) and composite onto the canvas
//! ```
//!
//! The output's pixel density is `export.pixel_ratio` (default 2) times
//! the layout units in `[export]`.

pub mod layout;
pub mod render;
pub mod text;

use crate::blobs::BlobStore;
use crate::board::Board;
use crate::color::ColorError;
use crate::config::RankerConfig;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub use render::render;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("could not decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("could not encode PNG: {0}")]
    Encode(#[source] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error("embedded font is unreadable: {0}")]
    Font(#[from] ab_glyph::InvalidFont),
}

/// Render the board and write it to `<dir>/<export.filename>.png`.
pub fn export_png(
    board: &Board,
    blobs: &BlobStore,
    config: &RankerConfig,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let canvas = render(board, blobs, config)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.png", config.export.filename));
    if let Err(e) = canvas.save_with_format(&path, ImageFormat::Png) {
        let _ = std::fs::remove_file(&path);
        return Err(ExportError::Encode(e));
    }
    info!(
        path = %path.display(),
        width = canvas.width(),
        height = canvas.height(),
        mode = %board.mode(),
        "exported view"
    );
    Ok(path)
}
