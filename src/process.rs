//! Per-image normalization pipeline.
//!
//! Takes the ordered [`SourceItem`]s from [`collect`](crate::collect) and turns
//! each into `<output>/<id>.png` (plus `<id>.txt` when a caption sidecar
//! exists). Items are processed one at a time, start to finish.
//!
//! ## Per-item stages
//!
//! ```text
//! decode ─✗→ Decode failure (no id)
//!   │
//! plan   ─✗→ MalformedImage failure (no id)
//!   │
//! render (resample, pad, encode PNG) ─✗→ Write failure (no id)
//!   │
//! write <id>.png ─✗→ Write failure (no id, partial file removed)
//!   │
//! commit id
//!   │
//! copy caption ─✗→ CaptionIo, item still counts as written
//! ```
//!
//! Every failure is returned as an [`ItemError`] and the run moves on to the
//! next item. The only error that stops a run is failing to create the output
//! directory ([`RunError`]).
//!
//! ## Identifiers
//!
//! Ids come from an [`OutputSequencer`] owned by the run. The id is committed
//! only after its PNG is on disk, so the written files are always exactly
//! `1.png ..= K.png` for K successful items, numbered in processing order.
//!
//! The output directory may hold files from an earlier run. Ids `1..=K` are
//! overwritten (a caption slot with no caption this time is cleared), and once
//! the last item is done every `<N>.png` / `<N>.<caption>` with N > K is
//! removed. Other files are left alone.
//!
//! ## Progress
//!
//! Nothing here prints. Progress is reported as [`ProcessEvent`]s over an
//! optional channel; [`output`](crate::output) formats them for the terminal.

use crate::collect::{OrderingPolicy, SourceItem, collect_sources};
use crate::config::NormalizeConfig;
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, RenderParams, RustBackend, plan_geometry,
};
use crate::sequence::OutputSequencer;
use crate::sidecar::{self, CaptionError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Why a single item was skipped.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("malformed image {path}: {width}x{height}")]
    MalformedImage {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error(transparent)]
    CaptionIo(#[from] CaptionError),
}

/// Failure category, for reporting and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Decode,
    MalformedImage,
    Write,
    CaptionIo,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Decode => "decode error",
            Self::MalformedImage => "malformed image",
            Self::Write => "write error",
            Self::CaptionIo => "caption error",
        };
        f.write_str(name)
    }
}

impl ItemError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Decode { .. } => FailureKind::Decode,
            Self::MalformedImage { .. } => FailureKind::MalformedImage,
            Self::Write { .. } => FailureKind::Write,
            Self::CaptionIo(_) => FailureKind::CaptionIo,
        }
    }
}

/// Fatal errors that abort a run before any item is processed.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What happened to an item's caption sidecar.
#[derive(Debug)]
pub enum CaptionOutcome {
    /// No sidecar next to the source image.
    Absent,
    Copied(PathBuf),
    /// The image was written but the caption could not be copied.
    Failed(ItemError),
}

/// A successfully written item.
#[derive(Debug)]
pub struct ProcessedItem {
    pub id: u32,
    pub source: PathBuf,
    pub image_path: PathBuf,
    pub caption: CaptionOutcome,
}

impl ProcessedItem {
    pub fn caption_path(&self) -> Option<&Path> {
        match &self.caption {
            CaptionOutcome::Copied(path) => Some(path),
            _ => None,
        }
    }
}

/// A skipped item and the reason.
#[derive(Debug)]
pub struct ItemFailure {
    pub source: PathBuf,
    pub error: ItemError,
}

/// Everything a run produced, in processing order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub processed: Vec<ProcessedItem>,
    pub failures: Vec<ItemFailure>,
    /// Numbered outputs from an earlier run that were removed.
    pub stale_removed: Vec<PathBuf>,
}

impl RunSummary {
    pub fn captions_copied(&self) -> usize {
        self.processed
            .iter()
            .filter(|item| item.caption_path().is_some())
            .count()
    }

    pub fn caption_failures(&self) -> usize {
        self.processed
            .iter()
            .filter(|item| matches!(item.caption, CaptionOutcome::Failed(_)))
            .count()
    }
}

/// Progress events emitted while a run is going.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    RunStarted {
        total: usize,
        order: OrderingPolicy,
    },
    ItemWritten {
        id: u32,
        source: PathBuf,
        output: PathBuf,
        caption: Option<PathBuf>,
    },
    CaptionFailed {
        id: u32,
        source: PathBuf,
        reason: String,
    },
    ItemFailed {
        source: PathBuf,
        kind: FailureKind,
        reason: String,
    },
    StaleRemoved {
        path: PathBuf,
    },
    StaleKept {
        path: PathBuf,
        reason: String,
    },
}

/// Normalize every image under `input_dir` into `output_dir` with the pure Rust backend.
pub fn process(
    input_dir: &Path,
    output_dir: &Path,
    config: &NormalizeConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunSummary, RunError> {
    process_with_backend(&RustBackend::new(), input_dir, output_dir, config, events)
}

/// Run the pipeline using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    input_dir: &Path,
    output_dir: &Path,
    config: &NormalizeConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunSummary, RunError> {
    std::fs::create_dir_all(output_dir).map_err(|source| RunError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let items = collect_sources(input_dir, &config.collect);
    emit(
        &events,
        ProcessEvent::RunStarted {
            total: items.len(),
            order: config.collect.order,
        },
    );

    let mut sequencer = OutputSequencer::new();
    let mut summary = RunSummary::default();

    for item in items {
        match process_item(backend, &item, config, output_dir, &mut sequencer) {
            Ok(processed) => {
                emit(
                    &events,
                    ProcessEvent::ItemWritten {
                        id: processed.id,
                        source: processed.source.clone(),
                        output: processed.image_path.clone(),
                        caption: processed.caption_path().map(Path::to_path_buf),
                    },
                );
                if let CaptionOutcome::Failed(err) = &processed.caption {
                    emit(
                        &events,
                        ProcessEvent::CaptionFailed {
                            id: processed.id,
                            source: processed.source.clone(),
                            reason: err.to_string(),
                        },
                    );
                }
                summary.processed.push(processed);
            }
            Err(error) => {
                emit(
                    &events,
                    ProcessEvent::ItemFailed {
                        source: item.path.clone(),
                        kind: error.kind(),
                        reason: error.to_string(),
                    },
                );
                summary.failures.push(ItemFailure {
                    source: item.path,
                    error,
                });
            }
        }
    }

    let extensions = ["png", config.output.caption_extension.as_str()];
    for path in stale_outputs(output_dir, sequencer.issued(), &extensions) {
        match std::fs::remove_file(&path) {
            Ok(()) => {
                emit(&events, ProcessEvent::StaleRemoved { path: path.clone() });
                summary.stale_removed.push(path);
            }
            Err(e) => emit(
                &events,
                ProcessEvent::StaleKept {
                    path,
                    reason: e.to_string(),
                },
            ),
        }
    }

    Ok(summary)
}

/// Id of a file named `<N>.<ext>` with one of `extensions`.
///
/// Only the exact spelling this pipeline writes counts: `7.png`, not `07.png`.
fn output_id(path: &Path, extensions: &[&str]) -> Option<u32> {
    let ext = path.extension()?.to_str()?;
    if !extensions.contains(&ext) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let id: u32 = stem.parse().ok()?;
    (id.to_string() == stem).then_some(id)
}

/// Numbered outputs in `output_dir` with an id above `issued`, lowest id first.
fn stale_outputs(output_dir: &Path, issued: u32, extensions: &[&str]) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(output_dir) else {
        return Vec::new();
    };
    let mut stale: Vec<(u32, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| path.is_file())
        .filter_map(|path| output_id(&path, extensions).map(|id| (id, path)))
        .filter(|(id, _)| *id > issued)
        .collect();
    stale.sort();
    stale.into_iter().map(|(_, path)| path).collect()
}

/// Process a single item: decode, plan, render, write, copy caption.
///
/// An id is taken from `sequencer` only when `<id>.png` was written.
pub fn process_item(
    backend: &impl ImageBackend,
    item: &SourceItem,
    config: &NormalizeConfig,
    output_dir: &Path,
    sequencer: &mut OutputSequencer,
) -> Result<ProcessedItem, ItemError> {
    let source = &item.path;

    let image = backend.decode(source).map_err(|e| ItemError::Decode {
        path: source.clone(),
        source: e,
    })?;

    let natural = Dimensions::of(&image);
    let plan = plan_geometry(natural.as_tuple(), &config.resize.spec()).map_err(|e| {
        ItemError::MalformedImage {
            path: source.clone(),
            width: e.width,
            height: e.height,
        }
    })?;

    let params = RenderParams {
        plan,
        filter: config.resize.filter,
        background: config.output.background,
    };
    let png = backend
        .render(image, &params)
        .map_err(|e| ItemError::Write {
            path: source.clone(),
            source: e,
        })?;

    let id = sequencer.peek_id();
    let image_path = output_dir.join(format!("{id}.png"));
    if let Err(e) = std::fs::write(&image_path, &png) {
        // Remove any partial file, the next item reuses this id
        let _ = std::fs::remove_file(&image_path);
        return Err(ItemError::Write {
            path: image_path,
            source: BackendError::Io(e),
        });
    }
    let id = sequencer.next_id();

    let caption =
        match sidecar::propagate(source, id, output_dir, &config.output.caption_extension) {
            Ok(Some(path)) => CaptionOutcome::Copied(path),
            Ok(None) => CaptionOutcome::Absent,
            Err(e) => CaptionOutcome::Failed(e.into()),
        };

    Ok(ProcessedItem {
        id,
        source: source.clone(),
        image_path,
        caption,
    })
}

fn emit(events: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A closed receiver only means nobody is listening
        let _ = tx.send(event);
    }
}
