//! Filesystem loader.
//!
//! ```text
//! ResolvedUrl("src/app.html")
//!        │  join onto root, reject `..` escapes
//!        ▼
//! <root>/src/app.html ──spawn_blocking──▶ std::fs::metadata + std::fs::read
//! ```

// The one place that reads files on behalf of the analyzer
#![allow(clippy::disallowed_methods)]

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use prism_graph::ResolvedUrl;
use tokio::task;
use tracing::debug;
use walkdir::WalkDir;

use super::UrlLoader;
use crate::error::LoadError;

/// Default upper bound on the size of a loaded file (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Loads package-relative URLs from a root directory.
#[derive(Debug, Clone)]
pub struct FsUrlLoader {
    root: PathBuf,
    max_file_size: u64,
}

impl FsUrlLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Refuse files larger than `bytes`.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file behind `url`, if the URL is a plain relative path that stays
    /// inside the root.
    fn path_for(&self, url: &ResolvedUrl) -> Option<PathBuf> {
        let url = url.as_str();
        if url.contains("://") || url.starts_with('/') {
            return None;
        }
        let relative = Path::new(url);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl UrlLoader for FsUrlLoader {
    fn can_load(&self, url: &ResolvedUrl) -> bool {
        self.path_for(url).is_some_and(|path| path.is_file())
    }

    async fn load(&self, url: &ResolvedUrl) -> Result<String, LoadError> {
        let path = self
            .path_for(url)
            .ok_or_else(|| LoadError::NotFound(url.clone()))?;
        let url = url.clone();
        let limit = self.max_file_size;

        task::spawn_blocking(move || {
            let metadata = std::fs::metadata(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LoadError::NotFound(url.clone())
                } else {
                    LoadError::Io {
                        url: url.clone(),
                        message: e.to_string(),
                    }
                }
            })?;
            if metadata.len() > limit {
                return Err(LoadError::TooLarge {
                    url,
                    size: metadata.len(),
                    limit,
                });
            }

            let bytes = std::fs::read(&path).map_err(|e| LoadError::Io {
                url: url.clone(),
                message: e.to_string(),
            })?;
            debug!(%url, bytes = bytes.len(), "loaded from disk");
            String::from_utf8(bytes).map_err(|_| LoadError::InvalidUtf8(url))
        })
        .await
        .map_err(|e| LoadError::Other(format!("Task join error: {e}")))?
    }

    async fn list(&self, excluded_dirs: &[String]) -> Result<Vec<ResolvedUrl>, LoadError> {
        let root = self.root.clone();
        let excluded_dirs = excluded_dirs.to_vec();

        task::spawn_blocking(move || {
            let mut urls = Vec::new();
            let walker = WalkDir::new(&root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| {
                    entry.depth() == 0
                        || !entry.file_type().is_dir()
                        || !excluded_dirs
                            .iter()
                            .any(|dir| entry.file_name().to_str() == Some(dir.as_str()))
                });

            for entry in walker {
                let entry = entry.map_err(|e| LoadError::Other(e.to_string()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(&root) else {
                    continue;
                };
                let url = relative
                    .components()
                    .filter_map(|component| component.as_os_str().to_str())
                    .collect::<Vec<_>>()
                    .join("/");
                urls.push(ResolvedUrl::new(url));
            }
            Ok(urls)
        })
        .await
        .map_err(|e| LoadError::Other(format!("Task join error: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for (path, contents) in files {
            let path = temp.path().join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
        }
        temp
    }

    #[tokio::test]
    async fn loads_files_under_the_root() {
        let temp = project(&[("src/a.html", "<a-b></a-b>")]);
        let loader = FsUrlLoader::new(temp.path());
        let url = ResolvedUrl::new("src/a.html");

        assert!(loader.can_load(&url));
        assert_eq!(loader.load(&url).await.unwrap(), "<a-b></a-b>");
        assert!(!loader.can_load(&ResolvedUrl::new("src/missing.html")));
    }

    #[tokio::test]
    async fn refuses_escaping_and_oversized_files() {
        let temp = project(&[("big.js", "0123456789")]);
        let loader = FsUrlLoader::new(temp.path()).with_max_file_size(4);

        assert!(!loader.can_load(&ResolvedUrl::new("../etc/passwd")));
        assert!(!loader.can_load(&ResolvedUrl::new("https://example.com/a.js")));
        let error = loader.load(&ResolvedUrl::new("big.js")).await.unwrap_err();
        assert!(matches!(error, LoadError::TooLarge { size: 10, limit: 4, .. }));
    }

    #[tokio::test]
    async fn lists_files_outside_excluded_directories() {
        let temp = project(&[
            ("index.html", ""),
            ("src/app.js", ""),
            ("node_modules/dep/index.js", ""),
            ("bower_components/paper/paper.html", ""),
        ]);
        let loader = FsUrlLoader::new(temp.path());
        let excluded: Vec<String> = crate::loader::DEFAULT_EXCLUDED_DIRS
            .iter()
            .map(|dir| dir.to_string())
            .collect();

        let urls = loader.list(&excluded).await.unwrap();
        let urls: Vec<_> = urls.iter().map(ResolvedUrl::as_str).collect();
        assert_eq!(urls, ["index.html", "src/app.js"]);
    }
}
