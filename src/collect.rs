//! Input discovery and ordering.
//!
//! Walks the input tree, keeps files with a recognized image extension, and
//! returns them in one of three orders. The set of files is the same for every
//! order; only the sequence (and therefore the output ids) changes.
//!
//! ## Orders
//!
//! | Policy | Sequence |
//! |---|---|
//! | [`OrderingPolicy::Folder`] | Directory by directory, depth-first. A directory's own files come before anything in its subdirectories; within a directory, the filesystem's listing order. |
//! | [`OrderingPolicy::File`] | Stable sort on the file name, case-insensitive, ignoring the directory. |
//! | [`OrderingPolicy::Random`] | Uniform shuffle. Reproducible when a seed is given. |
//!
//! Unreadable directories and entries are skipped. Discovery never fails; an
//! empty or missing root simply yields no items.

use crate::config::CollectConfig;
use clap::ValueEnum;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Order in which discovered files are fed to the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OrderingPolicy {
    /// Directory by directory, in walk order
    #[default]
    Folder,
    /// Sorted by file name, case-insensitive
    File,
    /// Shuffled
    Random,
}

impl fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Folder => "folder",
            Self::File => "file",
            Self::Random => "random",
        };
        f.write_str(name)
    }
}

/// A discovered input image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceItem {
    pub path: PathBuf,
}

impl SourceItem {
    /// File name used for [`OrderingPolicy::File`] sorting.
    pub fn sort_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

/// Check the extension against the recognized list, ignoring case.
pub fn is_recognized(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

/// Discover images under `root` and order them per `config`.
pub fn collect_sources(root: &Path, config: &CollectConfig) -> Vec<SourceItem> {
    let mut items = walk_folder_order(root, &config.extensions);

    match config.order {
        OrderingPolicy::Folder => {}
        OrderingPolicy::File => items.sort_by_cached_key(SourceItem::sort_name),
        OrderingPolicy::Random => {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            items.shuffle(&mut rng);
        }
    }

    items
}

/// Walk the tree and group files by directory in pre-order.
///
/// `walkdir` descends into a subdirectory as soon as it meets it, which can
/// interleave a directory's files with its children's. Each file is tagged
/// with the pre-order rank of its parent and stably sorted on it, so every
/// directory's files stay together and precede its subdirectories.
fn walk_folder_order(root: &Path, extensions: &[String]) -> Vec<SourceItem> {
    let mut dir_rank: HashMap<PathBuf, usize> = HashMap::new();
    let mut files: Vec<(usize, PathBuf)> = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if entry.file_type().is_dir() {
            let rank = dir_rank.len();
            dir_rank.insert(path.to_path_buf(), rank);
        } else if path.is_file() && is_recognized(path, extensions) {
            let rank = path
                .parent()
                .and_then(|parent| dir_rank.get(parent))
                .copied()
                .unwrap_or(0);
            files.push((rank, path.to_path_buf()));
        }
    }

    files.sort_by_key(|(rank, _)| *rank);
    files
        .into_iter()
        .map(|(_, path)| SourceItem { path })
        .collect()
}
