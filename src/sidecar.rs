//! Caption sidecar files.
//!
//! A caption is a text file with the same stem as its image, in the same
//! directory: `photos/cat.jpg` pairs with `photos/cat.txt`. When the image is
//! written as `<output>/7.png`, the caption is copied to `<output>/7.txt`.
//!
//! Contents are copied byte for byte, with no trimming and no encoding check.
//!
//! `<output>/<id>.txt` always belongs to the image written under the same id
//! in the current run. When that image has no caption, a leftover file in
//! the slot is removed.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reading the sidecar or writing its copy failed.
#[derive(Error, Debug)]
#[error("caption {path}: {source}")]
pub struct CaptionError {
    /// The sidecar on read failures, the destination on write failures.
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Raw caption contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionPayload {
    pub text: Vec<u8>,
}

/// The sidecar path for an image: same directory and stem, `extension` swapped in.
pub fn caption_path_for(image_path: &Path, extension: &str) -> PathBuf {
    image_path.with_extension(extension)
}

/// Read the sidecar for `image_path`.
///
/// Returns `Ok(None)` when there is no sidecar file.
pub fn read_caption(image_path: &Path, extension: &str) -> std::io::Result<Option<CaptionPayload>> {
    let path = caption_path_for(image_path, extension);
    if !path.is_file() {
        return Ok(None);
    }
    std::fs::read(&path).map(|text| Some(CaptionPayload { text }))
}

/// Copy the sidecar of `image_path`, if any, to `<output_dir>/<id>.<extension>`.
///
/// Returns the written path, or `Ok(None)` when the image has no caption. In
/// that case any existing `<id>.<extension>` in `output_dir` is deleted.
pub fn propagate(
    image_path: &Path,
    id: u32,
    output_dir: &Path,
    extension: &str,
) -> Result<Option<PathBuf>, CaptionError> {
    let caption = read_caption(image_path, extension).map_err(|source| CaptionError {
        path: caption_path_for(image_path, extension),
        source,
    })?;
    let dest = output_dir.join(format!("{id}.{extension}"));
    let Some(caption) = caption else {
        if dest.is_file() {
            std::fs::remove_file(&dest).map_err(|source| CaptionError {
                path: dest.clone(),
                source,
            })?;
        }
        return Ok(None);
    };

    if let Err(source) = std::fs::write(&dest, &caption.text) {
        return Err(CaptionError { path: dest, source });
    }
    Ok(Some(dest))
}
