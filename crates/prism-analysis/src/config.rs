//! Engine options.

use std::path::PathBuf;

use crate::loader::{DEFAULT_EXCLUDED_DIRS, DEFAULT_MAX_FILE_SIZE, FsUrlLoader};

/// What the analyzer needs to know about the package it analyzes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// Package root; every URL is relative to it.
    pub root: PathBuf,
    /// Directory names skipped when listing the package.
    pub excluded_dirs: Vec<String>,
    /// Files larger than this many bytes are not loaded.
    pub max_file_size: u64,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|dir| dir.to_string())
                .collect(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl AnalyzerOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Filesystem loader for [`root`](Self::root).
    pub fn fs_loader(&self) -> FsUrlLoader {
        FsUrlLoader::new(&self.root).with_max_file_size(self.max_file_size)
    }
}
