//! Where document contents come from.
//!
//! The analysis context never touches the filesystem itself: every read goes
//! through a [`UrlLoader`]. [`FsUrlLoader`] reads from a package directory,
//! [`InMemoryUrlLoader`] serves fixed contents (editors with unsaved buffers,
//! tests).

mod fs;
mod memory;

pub use fs::{DEFAULT_MAX_FILE_SIZE, FsUrlLoader};
pub use memory::InMemoryUrlLoader;

use async_trait::async_trait;
use prism_graph::ResolvedUrl;

use crate::error::LoadError;

/// Directories never listed by [`UrlLoader::list`].
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["bower_components", "node_modules"];

/// Loads document contents by resolved URL.
///
/// # Example
///
/// ```rust,ignore
/// use prism_analysis::loader::{UrlLoader, InMemoryUrlLoader};
///
/// let loader = InMemoryUrlLoader::new();
/// loader.insert("index.html", "<my-app></my-app>");
/// let contents = loader.load(&"index.html".into()).await?;
/// ```
#[async_trait]
pub trait UrlLoader: Send + Sync + std::fmt::Debug {
    /// Whether this loader is able to load `url` at all.
    fn can_load(&self, url: &ResolvedUrl) -> bool;

    async fn load(&self, url: &ResolvedUrl) -> Result<String, LoadError>;

    /// Every loadable URL, skipping directories named in `excluded_dirs`.
    ///
    /// Loaders that cannot enumerate their contents return
    /// [`LoadError::Other`].
    async fn list(&self, excluded_dirs: &[String]) -> Result<Vec<ResolvedUrl>, LoadError> {
        let _ = excluded_dirs;
        Err(LoadError::Other(format!("{self:?} cannot list its contents")))
    }
}

/// Whether any directory segment of `url` is excluded.
pub(crate) fn in_excluded_dir(url: &str, excluded_dirs: &[String]) -> bool {
    let mut segments: Vec<&str> = url.split('/').collect();
    segments.pop();
    segments
        .iter()
        .any(|segment| excluded_dirs.iter().any(|excluded| excluded == segment))
}
