//! Query-parameter strategy: the language travels as `?<param>=<slug>`.

use super::split_fragment;
use crate::language::LanguageRegistry;

/// Language token carried in a named query parameter. With `hide_default`
/// the default language's token is omitted and its absence reads back as
/// the default.
#[derive(Debug, Clone)]
pub struct QueryLinks {
    param: String,
    hide_default: bool,
}

impl QueryLinks {
    pub fn new(param: String, hide_default: bool) -> Self {
        Self {
            param,
            hide_default,
        }
    }

    /// Append `<param>=<slug>`, replacing any existing token first so the
    /// operation is idempotent. With `hide_default`, encoding the default
    /// language yields the token-less URL.
    pub fn add(&self, registry: &LanguageRegistry, url: &str, slug: &str) -> String {
        if self.hide_default && registry.default_language().is_some_and(|d| d.slug == slug) {
            return self.remove(url);
        }
        let stripped = self.remove(url);
        let (base, fragment) = split_fragment(&stripped);
        let sep = if base.contains('?') { '&' } else { '?' };
        format!("{}{}{}={}{}", base, sep, self.param, slug, fragment)
    }

    /// Drop the language parameter, keeping every other query pair intact.
    pub fn remove(&self, url: &str) -> String {
        let (before_fragment, fragment) = split_fragment(url);
        let Some(question) = before_fragment.find('?') else {
            return url.to_string();
        };
        let (path, query) = before_fragment.split_at(question);

        let kept: Vec<&str> = query[1..]
            .split('&')
            .filter(|pair| pair.split('=').next() != Some(self.param.as_str()))
            .collect();

        if kept.is_empty() {
            format!("{}{}", path, fragment)
        } else {
            format!("{}?{}{}", path, kept.join("&"), fragment)
        }
    }

    /// Read the token back. An unknown token reads as no language; a
    /// missing token reads as the default under `hide_default`.
    pub fn extract(&self, registry: &LanguageRegistry, url: &str) -> Option<String> {
        let (before_fragment, _) = split_fragment(url);
        let token = before_fragment.find('?').and_then(|question| {
            before_fragment[question + 1..].split('&').find_map(|pair| {
                let mut parts = pair.splitn(2, '=');
                if parts.next() == Some(self.param.as_str()) {
                    Some(parts.next().unwrap_or("").to_string())
                } else {
                    None
                }
            })
        });

        match token {
            Some(slug) if registry.exists(&slug) => Some(slug),
            Some(_) => None,
            None if self.hide_default => registry.default_language().map(|d| d.slug.clone()),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    fn lang(slug: &str, is_default: bool) -> Language {
        Language {
            slug: slug.to_string(),
            locale: format!("{}_XX", slug),
            order: 0,
            is_default,
            flag: None,
        }
    }

    fn registry() -> LanguageRegistry {
        LanguageRegistry::from_languages(vec![lang("en", true), lang("fr", false)])
    }

    fn links() -> QueryLinks {
        QueryLinks::new("lang".to_string(), false)
    }

    fn hiding_links() -> QueryLinks {
        QueryLinks::new("lang".to_string(), true)
    }

    // ==================== Add Tests ====================

    #[test]
    fn test_add_to_bare_url() {
        assert_eq!(
            links().add(&registry(), "/about", "fr"),
            "/about?lang=fr"
        );
    }

    #[test]
    fn test_add_to_url_with_query() {
        assert_eq!(
            links().add(&registry(), "/about?page=2", "fr"),
            "/about?page=2&lang=fr"
        );
    }

    #[test]
    fn test_add_keeps_fragment_last() {
        assert_eq!(
            links().add(&registry(), "/about#team", "fr"),
            "/about?lang=fr#team"
        );
    }

    #[test]
    fn test_add_is_idempotent() {
        let links = links();
        let registry = registry();
        let once = links.add(&registry, "/about", "fr");
        let twice = links.add(&registry, &once, "fr");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_add_replaces_existing_token() {
        assert_eq!(
            links().add(&registry(), "/about?lang=en", "fr"),
            "/about?lang=fr"
        );
    }

    #[test]
    fn test_add_default_hidden() {
        assert_eq!(hiding_links().add(&registry(), "/about", "en"), "/about");
    }

    #[test]
    fn test_add_hidden_default_strips_existing_token() {
        // Switching a fr-tagged URL to the hidden default must land on the
        // token-less form, not keep the fr token.
        let links = hiding_links();
        let registry = registry();
        assert_eq!(links.add(&registry, "/about?lang=fr", "en"), "/about");
        assert_eq!(
            links.extract(&registry, &links.add(&registry, "/about?lang=fr", "en")),
            Some("en".to_string())
        );
    }

    #[test]
    fn test_add_default_visible_without_hiding() {
        assert_eq!(
            links().add(&registry(), "/about", "en"),
            "/about?lang=en"
        );
    }

    // ==================== Remove Tests ====================

    #[test]
    fn test_remove_sole_parameter() {
        assert_eq!(links().remove("/about?lang=fr"), "/about");
    }

    #[test]
    fn test_remove_keeps_other_parameters() {
        assert_eq!(
            links().remove("/about?page=2&lang=fr"),
            "/about?page=2"
        );
        assert_eq!(
            links().remove("/about?lang=fr&page=2"),
            "/about?page=2"
        );
    }

    #[test]
    fn test_remove_without_token_is_noop() {
        assert_eq!(links().remove("/about?page=2"), "/about?page=2");
        assert_eq!(links().remove("/about"), "/about");
    }

    #[test]
    fn test_remove_keeps_fragment() {
        assert_eq!(links().remove("/about?lang=fr#team"), "/about#team");
    }

    // ==================== Extract Tests ====================

    #[test]
    fn test_extract_known_token() {
        assert_eq!(
            links().extract(&registry(), "/about?lang=fr"),
            Some("fr".to_string())
        );
    }

    #[test]
    fn test_extract_unknown_token() {
        assert_eq!(links().extract(&registry(), "/about?lang=xx"), None);
    }

    #[test]
    fn test_extract_missing_token() {
        assert_eq!(links().extract(&registry(), "/about"), None);
    }

    #[test]
    fn test_extract_missing_token_hide_default() {
        assert_eq!(
            hiding_links().extract(&registry(), "/about"),
            Some("en".to_string())
        );
    }

    #[test]
    fn test_extract_ignores_fragment() {
        assert_eq!(
            links().extract(&registry(), "/about?lang=fr#lang=en"),
            Some("fr".to_string())
        );
    }

    // ==================== Round-Trip Tests ====================

    #[test]
    fn test_round_trip() {
        let links = links();
        let registry = registry();
        for slug in ["en", "fr"] {
            let url = links.add(&registry, "/news?page=3", slug);
            assert_eq!(links.extract(&registry, &url), Some(slug.to_string()));
        }
    }

    #[test]
    fn test_round_trip_hidden_default() {
        let links = hiding_links();
        let registry = registry();
        let url = links.add(&registry, "/news", "en");
        assert_eq!(url, "/news");
        assert_eq!(links.extract(&registry, &url), Some("en".to_string()));
    }
}
