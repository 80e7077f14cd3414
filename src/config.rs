use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::sync::SyncPolicy;

/// Which URL strategy the site runs. Selected once; every request goes
/// through the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinksMode {
    Query,
    Path,
    Domain,
}

/// Site-level configuration for the multilingual core.
///
/// Owned by administrative action; the core only reads it. Serializable so
/// a host application can keep it wherever it keeps settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Active URL strategy
    pub mode: LinksMode,

    /// Query parameter name for `LinksMode::Query` (default "lang")
    pub lang_param: String,

    /// Omit the default language's token from URLs
    pub hide_default: bool,

    /// slug -> host for `LinksMode::Domain`
    pub domains: BTreeMap<String, String>,

    /// Whether newly cloned term translations join the source's group
    pub link_term_translations: bool,

    /// Fields mirrored across translation groups on save
    pub sync: SyncPolicy,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            mode: LinksMode::Query,
            lang_param: "lang".to_string(),
            hide_default: false,
            domains: BTreeMap::new(),
            link_term_translations: true,
            sync: SyncPolicy::default(),
        }
    }
}

impl SiteConfig {
    /// Set the URL strategy.
    pub fn with_mode(mut self, mode: LinksMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the query parameter name.
    pub fn with_lang_param(mut self, param: impl Into<String>) -> Self {
        self.lang_param = param.into();
        self
    }

    /// Hide the default language's token in URLs.
    pub fn with_hide_default(mut self, hide: bool) -> Self {
        self.hide_default = hide;
        self
    }

    /// Map a language to its host (for `LinksMode::Domain`).
    pub fn with_domain(mut self, slug: impl Into<String>, host: impl Into<String>) -> Self {
        self.domains.insert(slug.into(), host.into());
        self
    }

    /// Set the synchronization policy.
    pub fn with_sync(mut self, sync: SyncPolicy) -> Self {
        self.sync = sync;
        self
    }

    /// Toggle group linkage for cloned term translations.
    pub fn with_link_term_translations(mut self, link: bool) -> Self {
        self.link_term_translations = link;
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .context(format!("Failed to read config file {}", path))?;
        serde_json::from_str(&raw).context(format!("Failed to parse config file {}", path))
    }
}
