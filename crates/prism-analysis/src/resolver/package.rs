use prism_graph::ResolvedUrl;

use super::UrlResolver;

/// Resolves URLs inside a single package.
///
/// Relative URLs are joined onto the directory of the importing document and
/// normalized; a leading `/` means the package root. URLs with a scheme,
/// and paths that climb above the package root, are not resolvable.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageUrlResolver;

impl PackageUrlResolver {
    pub fn new() -> Self {
        Self
    }
}

fn has_scheme(url: &str) -> bool {
    url.contains("://") || url.starts_with("data:") || url.starts_with("//")
}

/// Collapse `.` and `..` segments. `None` when the path leaves the root.
fn normalize(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            segment => segments.push(segment),
        }
    }
    Some(segments.join("/"))
}

impl UrlResolver for PackageUrlResolver {
    fn can_resolve(&self, url: &str) -> bool {
        !has_scheme(url)
    }

    fn resolve(&self, url: &str, base: Option<&ResolvedUrl>) -> Option<ResolvedUrl> {
        if has_scheme(url) {
            return None;
        }
        // Query strings and fragments never name a different file.
        let url = url.split(['?', '#']).next().unwrap_or_default();

        let joined = match (url.strip_prefix('/'), base) {
            (Some(absolute), _) => absolute.to_string(),
            (None, Some(base)) => {
                let directory = base
                    .as_str()
                    .rsplit_once('/')
                    .map_or("", |(directory, _)| directory);
                format!("{directory}/{url}")
            }
            (None, None) => url.to_string(),
        };

        normalize(&joined)
            .filter(|path| !path.is_empty())
            .map(ResolvedUrl::new)
    }
}
