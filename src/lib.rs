//! # imgseq
//!
//! Batch image normalizer for dataset preparation. Point it at a messy tree of
//! images (with optional caption sidecars) and it writes a flat directory of
//! `1.png`, `2.png`, … plus matching `1.txt`, `2.txt` captions, optionally
//! resized and padded to a common geometry.
//!
//! # Pipeline
//!
//! ```text
//! input tree ──collect──▶ ordered SourceItems ──process──▶ <out>/<N>.png
//!                                                   └────▶ <out>/<N>.txt
//! ```
//!
//! Items are handled one at a time. A failing item is reported and skipped
//! without using up a number, so the output is always exactly `1..=K` for K
//! written images.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`collect`] | Walks the input tree, filters image extensions, applies the ordering policy |
//! | [`imaging`] | Geometry planning (pure) and the decode/render backend built on the `image` crate |
//! | [`process`] | Per-item pipeline, failure taxonomy, progress events |
//! | [`sidecar`] | Caption sidecar lookup and verbatim copy |
//! | [`sequence`] | Gapless output id counter |
//! | [`config`] | Layered TOML configuration: defaults, config file, command-line flags |
//! | [`output`] | Console formatting of progress events and the run summary |
//!
//! # Design Decisions
//!
//! ## Geometry Is Pure
//!
//! All sizing arithmetic lives in [`imaging::plan_geometry`], a pure function
//! from natural size and [`imaging::ResizeSpec`] to an
//! [`imaging::GeometryPlan`]. The backend only executes plans, and the
//! pipeline is tested against a mock backend that records them.
//!
//! ## Ids Are Committed After the Write
//!
//! The [`sequence::OutputSequencer`] is peeked to name the file and advanced
//! only once the PNG is on disk. A failed write leaves no file behind and no
//! gap in the numbering.
//!
//! ## Deterministic Orders
//!
//! `folder` and `file` orders depend only on the input tree, so re-running on
//! an unchanged tree maps the same sources to the same ids. `random` is
//! reproducible when given a seed.

pub mod collect;
pub mod config;
pub mod imaging;
pub mod output;
pub mod process;
pub mod sequence;
pub mod sidecar;

#[cfg(test)]
pub(crate) mod test_helpers;
