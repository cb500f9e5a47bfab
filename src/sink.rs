//! Output locations for generated sources

use crate::{DiError, Result};
use ahash::RandomState;
use dashmap::DashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "logging")]
use tracing::trace;

/// Destination of generated files.
///
/// Paths are relative and use `/` as the separator.
pub trait OutputSink: Send + Sync {
    fn write(&self, relative_path: &str, source: &str) -> Result<()>;
}

/// Writes files below a root directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of `relative_path`
    pub fn path_of(&self, relative_path: &str) -> PathBuf {
        relative_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

impl OutputSink for DirectorySink {
    fn write(&self, relative_path: &str, source: &str) -> Result<()> {
        let path = self.path_of(relative_path);
        let output_error = |err: std::io::Error| DiError::Output {
            path: path.display().to_string(),
            reason: err.to_string(),
        };

        // Unchanged files are left alone so their mtime stays put
        if fs::read(&path).is_ok_and(|existing| existing == source.as_bytes()) {
            #[cfg(feature = "logging")]
            trace!(target: "dependency_compiler", path = %path.display(), "Generated file unchanged");

            return Ok(());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(output_error)?;
        }
        fs::write(&path, source).map_err(output_error)
    }
}

/// Keeps generated files in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    files: DashMap<String, String, RandomState>,
}

impl MemorySink {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents written to `relative_path`
    pub fn get(&self, relative_path: &str) -> Option<String> {
        self.files.get(relative_path).map(|entry| entry.value().clone())
    }

    /// Written paths, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.iter().map(|entry| entry.key().clone()).collect();
        paths.sort();
        paths
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl OutputSink for MemorySink {
    fn write(&self, relative_path: &str, source: &str) -> Result<()> {
        self.files.insert(relative_path.to_owned(), source.to_owned());
        Ok(())
    }
}
