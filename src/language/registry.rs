//! Language registry: single source of truth for configured languages.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::db::Database;

/// A configured language.
///
/// `slug` is the stable identifier used everywhere in the core (URLs,
/// translation groups); `locale` is the display/formatting code. Exactly
/// one language has `is_default = true` once any language exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Stable short identifier (e.g., "en", "fr")
    pub slug: String,

    /// Locale code for display and formatting (e.g., "en_US")
    pub locale: String,

    /// Presentation order; ties broken by slug
    pub order: i64,

    /// Whether this is the site default language
    pub is_default: bool,

    /// Optional flag reference for presentation
    pub flag: Option<String>,
}

/// Read model over the configured languages.
///
/// Loaded once from the database and handed out by reference. Mutation
/// happens through the administrative CRUD on `Database`; call
/// `LanguageRegistry::load` again afterwards to pick up changes.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
}

impl LanguageRegistry {
    /// Load the registry from the database, ordered by position then slug.
    pub fn load(db: &Database) -> Result<Self> {
        Ok(Self {
            languages: db.list_languages()?,
        })
    }

    /// Build a registry directly from a language list (tests, fixtures).
    pub fn from_languages(languages: Vec<Language>) -> Self {
        Self { languages }
    }

    /// All configured languages in presentation order.
    pub fn list(&self) -> &[Language] {
        &self.languages
    }

    /// Look up a language by slug. Absence means "use fallback", never a
    /// fatal condition.
    pub fn get(&self, slug: &str) -> Option<&Language> {
        self.languages.iter().find(|lang| lang.slug == slug)
    }

    /// The default language, or `None` in the pre-multilingual state
    /// (no languages configured yet).
    pub fn default_language(&self) -> Option<&Language> {
        self.languages.iter().find(|lang| lang.is_default)
    }

    /// Whether a slug names a configured language.
    pub fn exists(&self, slug: &str) -> bool {
        self.get(slug).is_some()
    }

    /// All configured slugs, in presentation order.
    pub fn slugs(&self) -> Vec<&str> {
        self.languages.iter().map(|lang| lang.slug.as_str()).collect()
    }

    /// True when no language is configured.
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}
