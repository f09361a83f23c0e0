//! Canonical document identity.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A resolved, canonical document URL.
///
/// Produced by a URL resolver from whatever text appeared in an `href`,
/// `src` or `import` specifier. The string is reference counted so cloning a
/// key into several caches stays cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedUrl(Arc<str>);

impl ResolvedUrl {
    /// Wrap an already-resolved URL.
    pub fn new(url: impl AsRef<str>) -> Self {
        Self(Arc::from(url.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file extension without the leading dot, or `""`.
    ///
    /// Query strings and fragments are ignored, and a dot inside a
    /// directory name does not count.
    pub fn extension(&self) -> &str {
        let path = self.0.split(['?', '#']).next().unwrap_or_default();
        let file_name = path.rsplit('/').next().unwrap_or(path);
        match file_name.rfind('.') {
            Some(idx) if idx > 0 => &file_name[idx + 1..],
            _ => "",
        }
    }
}

impl fmt::Debug for ResolvedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResolvedUrl({:?})", &*self.0)
    }
}

impl fmt::Display for ResolvedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResolvedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ResolvedUrl {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResolvedUrl {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for ResolvedUrl {
    fn from(url: String) -> Self {
        Self(Arc::from(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_ignores_query_and_directories() {
        assert_eq!(ResolvedUrl::new("a/b.html").extension(), "html");
        assert_eq!(ResolvedUrl::new("a/b.js?v=2").extension(), "js");
        assert_eq!(ResolvedUrl::new("dir.d/file").extension(), "");
        assert_eq!(ResolvedUrl::new(".hidden").extension(), "");
        assert_eq!(ResolvedUrl::new("style.min.css#x").extension(), "css");
    }

    #[test]
    fn borrows_as_str_for_map_lookups() {
        let mut map = rustc_hash::FxHashMap::default();
        map.insert(ResolvedUrl::new("x.html"), 1);
        assert_eq!(map.get("x.html"), Some(&1));
    }
}
