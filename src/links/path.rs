//! Path-prefix strategy: the language is the first path segment.

use super::path_bounds;
use crate::language::LanguageRegistry;

/// Language token carried as the leading path segment:
/// `<scheme>://<host>/<slug>/<original-path-without-leading-slash>`.
#[derive(Debug, Clone)]
pub struct PathLinks {
    hide_default: bool,
}

impl PathLinks {
    pub fn new(hide_default: bool) -> Self {
        Self { hide_default }
    }

    /// Insert `/<slug>` before the path, replacing any existing language
    /// prefix first so the operation is idempotent. With `hide_default`,
    /// encoding the default language yields the prefix-less URL.
    pub fn add(&self, registry: &LanguageRegistry, url: &str, slug: &str) -> String {
        if self.hide_default && registry.default_language().is_some_and(|d| d.slug == slug) {
            return self.remove(registry, url);
        }
        let stripped = self.remove(registry, url);
        let Some((start, _)) = path_bounds(&stripped) else {
            return url.to_string();
        };
        format!("{}/{}{}", &stripped[..start], slug, &stripped[start..])
    }

    /// Strip the leading language segment, if the first segment names a
    /// configured language.
    pub fn remove(&self, registry: &LanguageRegistry, url: &str) -> String {
        let Some((start, end)) = path_bounds(url) else {
            return url.to_string();
        };
        let Some(trimmed) = url[start..end].strip_prefix('/') else {
            return url.to_string();
        };
        let (segment, rest) = match trimmed.find('/') {
            Some(i) => trimmed.split_at(i),
            None => (trimmed, ""),
        };
        if !registry.exists(segment) {
            return url.to_string();
        }
        // A relative URL that was only the language segment collapses to "/".
        let rest = if rest.is_empty() && start == 0 { "/" } else { rest };
        format!("{}{}{}", &url[..start], rest, &url[end..])
    }

    /// Read the leading segment back. A non-language first segment reads
    /// as no language; no language prefix reads as the default under
    /// `hide_default`.
    pub fn extract(&self, registry: &LanguageRegistry, url: &str) -> Option<String> {
        let segment = path_bounds(url).and_then(|(start, end)| {
            let trimmed = url[start..end].strip_prefix('/')?;
            let segment = match trimmed.find('/') {
                Some(i) => &trimmed[..i],
                None => trimmed,
            };
            registry.exists(segment).then(|| segment.to_string())
        });

        match segment {
            Some(slug) => Some(slug),
            None if self.hide_default => registry.default_language().map(|d| d.slug.clone()),
            None => None,
        }
    }
}
