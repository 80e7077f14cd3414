//! Domain strategy: each language has its own host name.

use super::host_bounds;
use crate::language::LanguageRegistry;
use std::collections::BTreeMap;

/// Language encoded by host: `fr` maps to `example.fr`, and so on. Path
/// and query are never touched. Relative URLs carry no host and pass
/// through unchanged.
#[derive(Debug, Clone)]
pub struct DomainLinks {
    /// slug -> host (no scheme)
    domains: BTreeMap<String, String>,
}

impl DomainLinks {
    pub fn new(domains: BTreeMap<String, String>) -> Self {
        Self { domains }
    }

    /// Swap the host for the language's configured host. Languages without
    /// a configured host leave the URL unchanged.
    pub fn add(&self, url: &str, slug: &str) -> String {
        let Some(host) = self.domains.get(slug) else {
            return url.to_string();
        };
        let Some((start, end)) = host_bounds(url) else {
            return url.to_string();
        };
        format!("{}{}{}", &url[..start], host, &url[end..])
    }

    /// Map the URL back onto the default language's host.
    pub fn remove(&self, registry: &LanguageRegistry, url: &str) -> String {
        match registry.default_language() {
            Some(default) => self.add(url, &default.slug),
            None => url.to_string(),
        }
    }

    /// Reverse-lookup the host. An unconfigured host reads as no language.
    pub fn extract(&self, url: &str) -> Option<String> {
        let (start, end) = host_bounds(url)?;
        let host = &url[start..end];
        self.domains
            .iter()
            .find(|(_, configured)| configured.as_str() == host)
            .map(|(slug, _)| slug.clone())
    }
}
