//! Language resolution: one decision per invocation, no state between
//! calls.
//!
//! Content creation walks a fixed priority chain and stops at the first
//! source that yields a configured language; the system default terminates
//! the chain, so resolution never fails while at least one language is
//! configured. Each step is a named function so it can be tested in
//! isolation. Request-time resolution validates the URL token and falls
//! back to the caller's preferred language and then the default.

use tracing::debug;

use crate::error::{Error, Result};
use crate::group::{ObjectId, ObjectKind, TranslationGroups};
use crate::language::{Language, LanguageRegistry, RequestContext};

/// Who is creating or editing content.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    /// Restricted (translator-only) authorization: may only produce
    /// content in the listed languages
    pub translator_only: bool,

    /// Languages the caller may produce content in. Ignored for
    /// unrestricted callers, who may author in any configured language.
    pub allowed: Vec<String>,
}

impl Caller {
    /// An unrestricted caller (editor, administrator).
    pub fn editor() -> Self {
        Self::default()
    }

    /// A translator restricted to the given languages.
    pub fn translator(allowed: Vec<String>) -> Self {
        Self {
            translator_only: true,
            allowed,
        }
    }

    /// Whether the caller may produce content in `slug`.
    pub fn can_author(&self, slug: &str) -> bool {
        !self.translator_only || self.allowed.iter().any(|a| a == slug)
    }
}

/// Inputs to creation-time resolution, supplied entirely by the caller.
#[derive(Debug, Clone)]
pub struct CreationRequest {
    pub kind: ObjectKind,

    /// Explicit administrative override parameter
    pub admin_override: Option<String>,

    /// Generic request-scoped language parameter
    pub request_param: Option<String>,

    /// Language carried by a structured request (e.g., an API payload)
    pub payload_language: Option<String>,

    /// Structural parent of the object being created, if it has one
    pub parent: Option<ObjectId>,
}

impl CreationRequest {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            admin_override: None,
            request_param: None,
            payload_language: None,
            parent: None,
        }
    }

    pub fn with_admin_override(mut self, slug: impl Into<String>) -> Self {
        self.admin_override = Some(slug.into());
        self
    }

    pub fn with_request_param(mut self, slug: impl Into<String>) -> Self {
        self.request_param = Some(slug.into());
        self
    }

    pub fn with_payload_language(mut self, slug: impl Into<String>) -> Self {
        self.payload_language = Some(slug.into());
        self
    }

    pub fn with_parent(mut self, parent: ObjectId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Stateless resolver over the registry and group membership.
pub struct LanguageResolver<'a> {
    registry: &'a LanguageRegistry,
    groups: &'a TranslationGroups<'a>,
}

impl<'a> LanguageResolver<'a> {
    pub fn new(registry: &'a LanguageRegistry, groups: &'a TranslationGroups<'a>) -> Self {
        Self { registry, groups }
    }

    /// Deduce the language for a new or edited object.
    ///
    /// Evaluates, in order: admin override, request parameter, payload
    /// language, the structural parent's language, the caller's preferred
    /// language, the current request language, the restricted-translator
    /// fallback, and finally the system default. Identical inputs always
    /// produce the identical language. Errors only surface from storage
    /// (parent lookup) or when no language is configured at all
    /// (`NotFound`, the pre-multilingual state).
    pub fn resolve_for_creation(
        &self,
        request: &CreationRequest,
        caller: &Caller,
        ctx: &RequestContext,
    ) -> Result<Language> {
        let resolved = self
            .from_admin_override(request)
            .or_else(|| self.from_request_param(request, ctx))
            .or_else(|| self.from_payload(request));

        let resolved = match resolved {
            Some(language) => Some(language),
            None => self.from_parent(request)?,
        };

        let resolved = resolved
            .or_else(|| self.from_preferred(caller, ctx))
            .or_else(|| self.from_current(ctx))
            .or_else(|| self.for_restricted_translator(caller));

        if let Some(language) = resolved {
            debug!(slug = %language.slug, "resolved creation language");
            return Ok(language.clone());
        }

        self.registry
            .default_language()
            .cloned()
            .ok_or_else(|| Error::not_found("no languages configured"))
    }

    /// Bind a language to an inbound read. `extracted` is the (validated
    /// or absent) token from the Links Strategy; unknown tokens arrive
    /// here as absent. The preferred language only applies when no token
    /// was present; the default closes the chain. `None` only in the
    /// pre-multilingual state.
    pub fn resolve_for_request(
        &self,
        extracted: Option<&str>,
        preferred: Option<&str>,
    ) -> Option<Language> {
        if let Some(language) = extracted.and_then(|slug| self.registry.get(slug)) {
            return Some(language.clone());
        }
        if extracted.is_none() {
            if let Some(language) = preferred.and_then(|slug| self.registry.get(slug)) {
                return Some(language.clone());
            }
        }
        self.registry.default_language().cloned()
    }

    /// Check that the caller may operate in `slug`.
    pub fn authorize(&self, caller: &Caller, slug: &str) -> Result<()> {
        if !self.registry.exists(slug) {
            return Err(Error::not_found(format!("language '{}'", slug)));
        }
        if caller.can_author(slug) {
            Ok(())
        } else {
            Err(Error::Authorization {
                lang: slug.to_string(),
            })
        }
    }

    // ==================== Chain Steps ====================

    /// Step 1: explicit administrative override.
    fn from_admin_override(&self, request: &CreationRequest) -> Option<&Language> {
        request
            .admin_override
            .as_deref()
            .and_then(|slug| self.registry.get(slug))
    }

    /// Step 2: generic request parameter (from the creation inputs or the
    /// request context), only when the operation carries no preferred
    /// language.
    fn from_request_param(
        &self,
        request: &CreationRequest,
        ctx: &RequestContext,
    ) -> Option<&Language> {
        if ctx.preferred.is_some() {
            return None;
        }
        request
            .request_param
            .as_deref()
            .or(ctx.requested.as_deref())
            .and_then(|slug| self.registry.get(slug))
    }

    /// Step 3: language supplied by a structured request.
    fn from_payload(&self, request: &CreationRequest) -> Option<&Language> {
        request
            .payload_language
            .as_deref()
            .and_then(|slug| self.registry.get(slug))
    }

    /// Step 4: the structural parent's language, when the parent is
    /// already linked.
    fn from_parent(&self, request: &CreationRequest) -> Result<Option<&Language>> {
        let Some(parent) = request.parent else {
            return Ok(None);
        };
        let parent_lang = self.groups.language_of(request.kind, parent)?;
        Ok(parent_lang.as_deref().and_then(|slug| self.registry.get(slug)))
    }

    /// Step 5: the caller's preferred language, if authorized for it.
    fn from_preferred(&self, caller: &Caller, ctx: &RequestContext) -> Option<&Language> {
        ctx.preferred
            .as_deref()
            .filter(|slug| caller.can_author(slug))
            .and_then(|slug| self.registry.get(slug))
    }

    /// Step 6: the current request language, if one is bound.
    fn from_current(&self, ctx: &RequestContext) -> Option<&Language> {
        ctx.current.as_deref().and_then(|slug| self.registry.get(slug))
    }

    /// Step 7: restricted translators land on the default when authorized
    /// for it, else on their first authorized language.
    fn for_restricted_translator(&self, caller: &Caller) -> Option<&Language> {
        if !caller.translator_only {
            return None;
        }
        if let Some(default) = self.registry.default_language() {
            if caller.can_author(&default.slug) {
                return Some(default);
            }
        }
        caller
            .allowed
            .iter()
            .find_map(|slug| self.registry.get(slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

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
        LanguageRegistry::from_languages(vec![
            lang("en", true),
            lang("fr", false),
            lang("de", false),
        ])
    }

    fn resolve(
        db: &Database,
        registry: &LanguageRegistry,
        request: &CreationRequest,
        caller: &Caller,
        ctx: &RequestContext,
    ) -> String {
        let groups = TranslationGroups::new(db);
        let resolver = LanguageResolver::new(registry, &groups);
        resolver
            .resolve_for_creation(request, caller, ctx)
            .unwrap()
            .slug
    }

    // ==================== Chain Step Tests ====================

    #[test]
    fn test_admin_override_wins() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let request = CreationRequest::new(ObjectKind::Post)
            .with_admin_override("de")
            .with_payload_language("fr");
        let ctx = RequestContext::new().with_current("fr");

        assert_eq!(resolve(&db, &registry, &request, &Caller::editor(), &ctx), "de");
    }

    #[test]
    fn test_unknown_admin_override_skipped() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let request = CreationRequest::new(ObjectKind::Post)
            .with_admin_override("xx")
            .with_payload_language("fr");

        let slug = resolve(
            &db,
            &registry,
            &request,
            &Caller::editor(),
            &RequestContext::new(),
        );
        assert_eq!(slug, "fr");
    }

    #[test]
    fn test_request_param_blocked_by_preferred() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let request = CreationRequest::new(ObjectKind::Post).with_request_param("de");

        // Without a preferred language the param applies.
        let slug = resolve(
            &db,
            &registry,
            &request,
            &Caller::editor(),
            &RequestContext::new(),
        );
        assert_eq!(slug, "de");

        // A preferred language suppresses the generic parameter and is
        // itself used further down the chain.
        let ctx = RequestContext::new().with_preferred("fr");
        assert_eq!(resolve(&db, &registry, &request, &Caller::editor(), &ctx), "fr");
    }

    #[test]
    fn test_requested_context_language_applies() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let request = CreationRequest::new(ObjectKind::Post);
        let ctx = RequestContext::new().with_requested("de").with_current("fr");

        assert_eq!(resolve(&db, &registry, &request, &Caller::editor(), &ctx), "de");
    }

    #[test]
    fn test_payload_language() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let request = CreationRequest::new(ObjectKind::Post).with_payload_language("fr");

        let slug = resolve(
            &db,
            &registry,
            &request,
            &Caller::editor(),
            &RequestContext::new(),
        );
        assert_eq!(slug, "fr");
    }

    #[test]
    fn test_parent_language_applies() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let groups = TranslationGroups::new(&db);
        groups.link(ObjectKind::Post, "de", 7, None).unwrap();

        let request = CreationRequest::new(ObjectKind::Post).with_parent(7);
        let slug = resolve(
            &db,
            &registry,
            &request,
            &Caller::editor(),
            &RequestContext::new(),
        );
        assert_eq!(slug, "de");
    }

    #[test]
    fn test_term_parent_language_applies() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let groups = TranslationGroups::new(&db);
        groups.link(ObjectKind::Term, "fr", 31, None).unwrap();

        let request = CreationRequest::new(ObjectKind::Term).with_parent(31);
        let ctx = RequestContext::new().with_preferred("de");
        // Parent term is checked before the preferred language.
        assert_eq!(resolve(&db, &registry, &request, &Caller::editor(), &ctx), "fr");
    }

    #[test]
    fn test_unlinked_parent_falls_through() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let request = CreationRequest::new(ObjectKind::Post).with_parent(7);
        let ctx = RequestContext::new().with_current("fr");

        assert_eq!(resolve(&db, &registry, &request, &Caller::editor(), &ctx), "fr");
    }

    #[test]
    fn test_preferred_requires_authorization() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let request = CreationRequest::new(ObjectKind::Post);
        let ctx = RequestContext::new().with_preferred("fr").with_current("de");

        // A translator without fr falls through to the current language.
        let translator = Caller::translator(vec!["de".to_string()]);
        assert_eq!(resolve(&db, &registry, &request, &translator, &ctx), "de");

        // An editor uses the preferred language directly.
        assert_eq!(resolve(&db, &registry, &request, &Caller::editor(), &ctx), "fr");
    }

    #[test]
    fn test_current_language_applies() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let request = CreationRequest::new(ObjectKind::Post);
        let ctx = RequestContext::new().with_current("fr");

        assert_eq!(resolve(&db, &registry, &request, &Caller::editor(), &ctx), "fr");
    }

    #[test]
    fn test_translator_lands_on_default_when_authorized() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let request = CreationRequest::new(ObjectKind::Post);
        let translator = Caller::translator(vec!["en".to_string(), "fr".to_string()]);

        let slug = resolve(&db, &registry, &request, &translator, &RequestContext::new());
        assert_eq!(slug, "en");
    }

    #[test]
    fn test_translator_falls_back_to_first_allowed() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let request = CreationRequest::new(ObjectKind::Post);
        let translator = Caller::translator(vec!["fr".to_string(), "de".to_string()]);

        let slug = resolve(&db, &registry, &request, &translator, &RequestContext::new());
        assert_eq!(slug, "fr");
    }

    #[test]
    fn test_no_inputs_resolves_default() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let request = CreationRequest::new(ObjectKind::Post);

        let slug = resolve(
            &db,
            &registry,
            &request,
            &Caller::editor(),
            &RequestContext::new(),
        );
        assert_eq!(slug, "en");
    }

    #[test]
    fn test_determinism() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let request = CreationRequest::new(ObjectKind::Post).with_request_param("fr");
        let caller = Caller::editor();
        let ctx = RequestContext::new().with_current("de");

        let first = resolve(&db, &registry, &request, &caller, &ctx);
        for _ in 0..5 {
            assert_eq!(resolve(&db, &registry, &request, &caller, &ctx), first);
        }
    }

    #[test]
    fn test_empty_registry_reports_not_found() {
        let db = Database::in_memory().unwrap();
        let registry = LanguageRegistry::default();
        let groups = TranslationGroups::new(&db);
        let resolver = LanguageResolver::new(&registry, &groups);

        let err = resolver
            .resolve_for_creation(
                &CreationRequest::new(ObjectKind::Post),
                &Caller::editor(),
                &RequestContext::new(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    // ==================== Request-Time Tests ====================

    #[test]
    fn test_request_explicit_token_wins() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let groups = TranslationGroups::new(&db);
        let resolver = LanguageResolver::new(&registry, &groups);

        let language = resolver.resolve_for_request(Some("fr"), Some("de")).unwrap();
        assert_eq!(language.slug, "fr");
    }

    #[test]
    fn test_request_preferred_beats_default_without_token() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let groups = TranslationGroups::new(&db);
        let resolver = LanguageResolver::new(&registry, &groups);

        let language = resolver.resolve_for_request(None, Some("de")).unwrap();
        assert_eq!(language.slug, "de");
    }

    #[test]
    fn test_request_falls_back_to_default() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let groups = TranslationGroups::new(&db);
        let resolver = LanguageResolver::new(&registry, &groups);

        assert_eq!(resolver.resolve_for_request(None, None).unwrap().slug, "en");
        // Unknown preferred cookie also lands on the default.
        assert_eq!(
            resolver.resolve_for_request(None, Some("xx")).unwrap().slug,
            "en"
        );
    }

    #[test]
    fn test_request_empty_registry() {
        let db = Database::in_memory().unwrap();
        let registry = LanguageRegistry::default();
        let groups = TranslationGroups::new(&db);
        let resolver = LanguageResolver::new(&registry, &groups);
        assert!(resolver.resolve_for_request(None, None).is_none());
    }

    // ==================== Authorization Tests ====================

    #[test]
    fn test_authorize_editor() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let groups = TranslationGroups::new(&db);
        let resolver = LanguageResolver::new(&registry, &groups);

        assert!(resolver.authorize(&Caller::editor(), "fr").is_ok());
    }

    #[test]
    fn test_authorize_translator_outside_scope() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let groups = TranslationGroups::new(&db);
        let resolver = LanguageResolver::new(&registry, &groups);

        let translator = Caller::translator(vec!["fr".to_string()]);
        assert!(resolver.authorize(&translator, "fr").is_ok());
        let err = resolver.authorize(&translator, "de").unwrap_err();
        assert!(matches!(err, Error::Authorization { .. }));
    }

    #[test]
    fn test_authorize_unknown_language() {
        let db = Database::in_memory().unwrap();
        let registry = registry();
        let groups = TranslationGroups::new(&db);
        let resolver = LanguageResolver::new(&registry, &groups);

        let err = resolver.authorize(&Caller::editor(), "xx").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
