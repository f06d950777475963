//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the pipeline in [`process`](crate::process) (which decides
//! the geometry of every output) and the [`backend`](super::backend) (which does
//! the actual pixel work). This separation allows swapping backends (e.g. for
//! testing with a mock) without changing the pipeline.
//!
//! ## Types
//!
//! - [`ResizeSpec`]: Declarative resize request: optional width, height, longest-side cap, square flag.
//! - [`GeometryPlan`]: Exact output raster size plus the optional square [`Canvas`].
//! - [`ResampleFilter`]: Resampling kernel used when the raster changes size.
//! - [`RenderParams`]: Everything the backend needs to turn a decoded raster into PNG bytes.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Declarative resize request.
///
/// No field set means "keep the natural size". Width and height together
/// stretch to exactly that size; either alone preserves the aspect ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeSpec {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Longest-side cap applied after width/height. Only ever shrinks.
    pub max_side: Option<u32>,
    /// Center the result on a square canvas.
    pub square: bool,
}

/// Square background the resized raster is pasted onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub side: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

/// Computed geometry for one image.
///
/// `width`/`height` are the dimensions of the resized raster. When `canvas` is
/// present, the final file is `side × side` with the raster pasted at the
/// canvas offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryPlan {
    pub width: u32,
    pub height: u32,
    pub canvas: Option<Canvas>,
}

impl GeometryPlan {
    /// Paste position of the raster on the canvas, `(0, 0)` without one.
    pub fn paste_offset(&self) -> (u32, u32) {
        self.canvas
            .map(|c| (c.offset_x, c.offset_y))
            .unwrap_or((0, 0))
    }

    /// Dimensions of the file that will be written.
    pub fn final_dimensions(&self) -> (u32, u32) {
        match self.canvas {
            Some(c) => (c.side, c.side),
            None => (self.width, self.height),
        }
    }

    /// Whether the raster has to be resampled from its natural size.
    pub fn needs_resample(&self, natural: (u32, u32)) -> bool {
        (self.width, self.height) != natural
    }
}

/// Resampling kernel, named the way config files spell it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Parameters for rendering a decoded raster into the final PNG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub plan: GeometryPlan,
    pub filter: ResampleFilter,
    /// Canvas fill colour, only used when the plan has a canvas.
    pub background: [u8; 3],
}
