//! Pure calculation functions for output geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Derived sides are rounded to the nearest integer with [`f64::round`]
//! (halves round away from zero) and never drop below 1px.

use super::params::{Canvas, GeometryPlan, ResizeSpec};
use thiserror::Error;

/// An image reported a zero width or height; no geometry can be derived.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("malformed image geometry {width}x{height}")]
pub struct MalformedImage {
    pub width: u32,
    pub height: u32,
}

/// Scale `side` by `target / reference`, rounded, at least 1.
///
/// `None` when the result does not fit in a `u32`.
fn scale_side(side: u32, target: u32, reference: u32) -> Option<u32> {
    let scaled = (f64::from(side) * f64::from(target) / f64::from(reference)).round();
    u32::try_from(scaled as u64).ok().map(|s| s.max(1))
}

/// Shrink `(width, height)` so the longer edge is at most `max_side`.
///
/// Dimensions already within the cap are returned unchanged.
///
/// # Examples
/// ```
/// # use imgseq::imaging::fit_within;
/// assert_eq!(fit_within((2000, 1000), 500), (500, 250));
/// assert_eq!(fit_within((300, 200), 500), (300, 200));
/// ```
pub fn fit_within(dimensions: (u32, u32), max_side: u32) -> (u32, u32) {
    let (w, h) = dimensions;
    let longer = w.max(h);
    if longer <= max_side {
        return (w, h);
    }
    // Shrinking keeps the short side below max_side, so it always fits
    if w >= h {
        (max_side, scale_side(h, max_side, w).unwrap_or(max_side))
    } else {
        (scale_side(w, max_side, h).unwrap_or(max_side), max_side)
    }
}

/// Compute the output geometry for an image of `natural` size.
///
/// Rules, in priority order:
/// 1. width and height → exactly that size (aspect ratio may change)
/// 2. width only → height follows the aspect ratio
/// 3. height only → width follows the aspect ratio
/// 4. neither → natural size
///
/// The longest-side cap is applied next, then the square canvas: its side is
/// the larger output dimension and the raster is centered with floor division.
///
/// # Examples
/// ```
/// # use imgseq::imaging::{plan_geometry, ResizeSpec};
/// let spec = ResizeSpec { width: Some(400), square: true, ..Default::default() };
/// let plan = plan_geometry((800, 400), &spec).unwrap();
/// assert_eq!((plan.width, plan.height), (400, 200));
/// assert_eq!(plan.paste_offset(), (0, 100));
/// ```
pub fn plan_geometry(
    natural: (u32, u32),
    spec: &ResizeSpec,
) -> Result<GeometryPlan, MalformedImage> {
    let (nat_w, nat_h) = natural;
    let malformed = MalformedImage {
        width: nat_w,
        height: nat_h,
    };
    if nat_w == 0 || nat_h == 0 {
        return Err(malformed);
    }

    let (mut width, mut height) = match (spec.width, spec.height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scale_side(nat_h, w, nat_w).ok_or(malformed)?),
        (None, Some(h)) => (scale_side(nat_w, h, nat_h).ok_or(malformed)?, h),
        (None, None) => (nat_w, nat_h),
    };

    if let Some(max_side) = spec.max_side {
        (width, height) = fit_within((width, height), max_side);
    }

    let canvas = spec.square.then(|| {
        let side = width.max(height);
        Canvas {
            side,
            offset_x: (side - width) / 2,
            offset_y: (side - height) / 2,
        }
    });

    Ok(GeometryPlan {
        width,
        height,
        canvas,
    })
}
