//! Turning URLs found in source files into [`ResolvedUrl`]s.

mod package;

pub use package::PackageUrlResolver;

use prism_graph::ResolvedUrl;

/// Resolves import URLs relative to the document they appear in.
pub trait UrlResolver: Send + Sync + std::fmt::Debug {
    fn can_resolve(&self, url: &str) -> bool;

    /// Resolve `url` as written in `base`. `None` means the URL cannot be
    /// resolved by this resolver.
    fn resolve(&self, url: &str, base: Option<&ResolvedUrl>) -> Option<ResolvedUrl>;
}

/// Takes every URL verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl UrlResolver for IdentityResolver {
    fn can_resolve(&self, _url: &str) -> bool {
        true
    }

    fn resolve(&self, url: &str, _base: Option<&ResolvedUrl>) -> Option<ResolvedUrl> {
        Some(ResolvedUrl::new(url))
    }
}
