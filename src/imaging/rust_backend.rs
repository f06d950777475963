//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, BMP, GIF, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Colour normalization | `DynamicImage::into_rgb8` (alpha is dropped) |
//! | Resize | `image::imageops::resize` (Lanczos3 unless configured otherwise) |
//! | Square pad | `RgbImage::from_pixel` + `image::imageops::replace` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |

use super::backend::{BackendError, ImageBackend};
use super::params::{Canvas, RenderParams};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, Rgb, RgbImage, imageops};
use std::path::Path;

/// Whether files with this extension can be decoded by the compiled-in codecs.
pub fn is_decodable_extension(ext: &str) -> bool {
    ImageFormat::from_extension(ext).is_some_and(|fmt| fmt.reading_enabled())
}

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
///
/// The format is sniffed from the file header first, so a PNG saved as
/// `.jpg` still decodes. Unknown headers fall back to the extension.
fn load_image(path: &Path) -> Result<image::DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Paste `image` at the canvas offset on a square filled with `background`.
fn pad_to_canvas(image: &RgbImage, canvas: Canvas, background: [u8; 3]) -> RgbImage {
    let mut padded = RgbImage::from_pixel(canvas.side, canvas.side, Rgb(background));
    imageops::replace(
        &mut padded,
        image,
        i64::from(canvas.offset_x),
        i64::from(canvas.offset_y),
    );
    padded
}

fn encode_png(image: &RgbImage) -> Result<Vec<u8>, BackendError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {}", e)))?;
    Ok(bytes)
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<RgbImage, BackendError> {
        Ok(load_image(path)?.into_rgb8())
    }

    fn render(&self, image: RgbImage, params: &RenderParams) -> Result<Vec<u8>, BackendError> {
        let plan = &params.plan;
        let resized = if plan.needs_resample(image.dimensions()) {
            imageops::resize(&image, plan.width, plan.height, params.filter.filter_type())
        } else {
            image
        };

        match plan.canvas {
            Some(canvas) => encode_png(&pad_to_canvas(&resized, canvas, params.background)),
            None => encode_png(&resized),
        }
    }
}
