//! URL language strategies.
//!
//! A site runs exactly one strategy, chosen from configuration: the
//! language token lives in a named query parameter (`query`), in the first
//! path segment (`path`), or in the host name (`domain`). Each strategy is
//! a bidirectional mapping: `add_language` encodes a slug into a URL,
//! `remove_language` strips it, `extract_language` reads it back. For any
//! URL without a pre-existing token, `extract(add(url, slug)) == slug`.
//!
//! URLs are manipulated as strings on purpose: the wire formats are
//! bit-exact and include relative URLs like `/about`, which a parsing
//! round-trip would normalize.

mod domain;
mod path;
mod query;

pub use domain::DomainLinks;
pub use path::PathLinks;
pub use query::QueryLinks;

use crate::config::SiteConfig;
use crate::language::LanguageRegistry;

/// The active URL strategy, selected once from configuration.
#[derive(Debug, Clone)]
pub enum LinksStrategy {
    Query(QueryLinks),
    Path(PathLinks),
    Domain(DomainLinks),
}

impl LinksStrategy {
    /// Build the configured strategy.
    pub fn from_config(config: &SiteConfig) -> Self {
        match config.mode {
            crate::config::LinksMode::Query => LinksStrategy::Query(QueryLinks::new(
                config.lang_param.clone(),
                config.hide_default,
            )),
            crate::config::LinksMode::Path => {
                LinksStrategy::Path(PathLinks::new(config.hide_default))
            }
            crate::config::LinksMode::Domain => {
                LinksStrategy::Domain(DomainLinks::new(config.domains.clone()))
            }
        }
    }

    /// Encode `slug` into `url`. Idempotent; unknown slugs leave the URL
    /// unchanged, and under `hide_default` the default language maps to
    /// the token-less URL (any existing token is stripped).
    pub fn add_language(&self, registry: &LanguageRegistry, url: &str, slug: &str) -> String {
        if !registry.exists(slug) {
            return url.to_string();
        }
        match self {
            LinksStrategy::Query(links) => links.add(registry, url, slug),
            LinksStrategy::Path(links) => links.add(registry, url, slug),
            LinksStrategy::Domain(links) => links.add(url, slug),
        }
    }

    /// Strip the language token from `url`. URLs without a token are
    /// returned unchanged.
    pub fn remove_language(&self, registry: &LanguageRegistry, url: &str) -> String {
        match self {
            LinksStrategy::Query(links) => links.remove(url),
            LinksStrategy::Path(links) => links.remove(registry, url),
            LinksStrategy::Domain(links) => links.remove(registry, url),
        }
    }

    /// Read the language token out of `url`, validated against the
    /// registry. Under `hide_default` a token-less URL reports the default
    /// language.
    pub fn extract_language(&self, registry: &LanguageRegistry, url: &str) -> Option<String> {
        match self {
            LinksStrategy::Query(links) => links.extract(registry, url),
            LinksStrategy::Path(links) => links.extract(registry, url),
            LinksStrategy::Domain(links) => links.extract(url),
        }
    }
}

/// Split off the `#fragment`, returning (before, fragment-including-`#`).
pub(crate) fn split_fragment(url: &str) -> (&str, &str) {
    match url.find('#') {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    }
}

/// Byte range of the path within `url`: starts at the first `/` after the
/// host for absolute URLs, at 0 for host-relative URLs, and is empty for
/// absolute URLs without a path. `None` when the URL has no usable path
/// position (e.g., a bare relative word).
pub(crate) fn path_bounds(url: &str) -> Option<(usize, usize)> {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    if let Some(scheme_end) = url.find("://") {
        let host_start = scheme_end + 3;
        if host_start > end {
            return None;
        }
        match url[host_start..end].find('/') {
            Some(i) => Some((host_start + i, end)),
            None => Some((end, end)),
        }
    } else if url.starts_with('/') {
        Some((0, end))
    } else {
        None
    }
}

/// Byte range of the host within an absolute `url`.
pub(crate) fn host_bounds(url: &str) -> Option<(usize, usize)> {
    let scheme_end = url.find("://")?;
    let host_start = scheme_end + 3;
    let rest = &url[host_start..];
    let host_len = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    if host_len == 0 {
        return None;
    }
    Some((host_start, host_start + host_len))
}
