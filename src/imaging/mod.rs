//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from content) |
//! | **Plan** | [`plan_geometry`], pure dimension math |
//! | **Resize** | `imageops::resize`, Lanczos3 by default |
//! | **Pad** | white square canvas + `imageops::replace` |
//! | **Encode** | PNG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{MalformedImage, fit_within, plan_geometry};
pub use params::{Canvas, GeometryPlan, RenderParams, ResampleFilter, ResizeSpec};
pub use rust_backend::{RustBackend, is_decodable_extension};
