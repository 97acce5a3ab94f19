//! Image intake: turns user-supplied paths into staged [`ImageItem`]s.
//!
//! Each path is either a file or a directory. Directories are walked
//! recursively and their entries visited in sorted order, so adding the
//! same folder twice yields the same sequence of labels. Files are
//! classified by extension into a MIME type; anything that is not
//! `image/*` is dropped without complaint (logged at debug level).
//!
//! ```text
//! add shots/ extra.jpg notes.txt
//!   shots/a.png        → image/png   accepted
//!   shots/raw/b.webp   → image/webp  accepted
//!   extra.jpg          → image/jpeg  accepted
//!   notes.txt          → (none)      filtered
//! ```

use crate::blobs::{BlobError, BlobStore};
use crate::types::ImageItem;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("{0} does not exist")]
    Missing(PathBuf),
    #[error("walking {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error(transparent)]
    Blob(#[from] BlobError),
}

/// Formats whose decoders are compiled in. Export has to be able to read
/// back whatever intake accepts.
const ACCEPTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Tiff,
    ImageFormat::Bmp,
];

/// MIME type of `path`, judged by its extension, if it is a supported image.
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let format = ImageFormat::from_path(path).ok()?;
    if !ACCEPTED_FORMATS.contains(&format) {
        return None;
    }
    let mime = format.to_mime_type();
    mime.starts_with("image/").then_some(mime)
}

/// Expand `paths` into the list of image files they name, in order.
///
/// Files are kept in argument order; directory contents are sorted.
pub fn collect_images(paths: &[PathBuf]) -> Result<Vec<PathBuf>, IntakeError> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(IntakeError::Missing(path.clone()));
        }
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|source| IntakeError::Walk {
                    path: path.clone(),
                    source,
                })?;
                if entry.file_type().is_file() {
                    push_if_image(&mut files, entry.path());
                }
            }
        } else {
            push_if_image(&mut files, path);
        }
    }
    Ok(files)
}

fn push_if_image(files: &mut Vec<PathBuf>, path: &Path) {
    match image_mime_type(path) {
        Some(mime) => {
            debug!(path = %path.display(), mime, "accepted");
            files.push(path.to_path_buf());
        }
        None => debug!(path = %path.display(), "filtered: not an image"),
    }
}

/// Stage every image named by `paths` and return the new items, in order.
///
/// Allocates one blob per accepted file. If staging fails midway, the
/// blobs already acquired by this call are released before the error is
/// returned.
pub fn intake(blobs: &BlobStore, paths: &[PathBuf]) -> Result<Vec<ImageItem>, IntakeError> {
    let files = collect_images(paths)?;
    Ok(stage_all(blobs, &files)?)
}

/// Acquire a blob for each file. On the first failure every blob acquired
/// so far is released and that failure is returned.
fn stage_all(blobs: &BlobStore, files: &[PathBuf]) -> Result<Vec<ImageItem>, BlobError> {
    let mut items = Vec::with_capacity(files.len());
    for file in files {
        match blobs.acquire(file) {
            Ok(item) => items.push(item),
            Err(e) => {
                for item in items {
                    let id = item.id.clone();
                    if let Err(release) = blobs.release(item) {
                        warn!(%id, error = %release, "could not release blob after failed intake");
                    }
                }
                return Err(e);
            }
        }
    }
    Ok(items)
}
