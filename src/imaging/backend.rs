//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: decode (to a 3-channel RGB raster) and render (resample, pad,
//! encode as PNG).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Backends return PNG bytes; writing them to disk is up to the caller.

use super::params::RenderParams;
use image::RgbImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Width and height of a raster in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(image: &RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// The decoded raster is moved into [`render`](ImageBackend::render) so at most
/// one image is held in memory per item.
pub trait ImageBackend {
    /// Decode the file at `path` and normalize it to 8-bit RGB.
    fn decode(&self, path: &Path) -> Result<RgbImage, BackendError>;

    /// Resample and composite according to `params`, returning PNG bytes.
    fn render(&self, image: RgbImage, params: &RenderParams) -> Result<Vec<u8>, BackendError>;
}
