//! Top-level context tying the core together.
//!
//! `Site` owns the database, the configuration, and the language registry;
//! the resolver, group manager, sync engine, and term cloner are built on
//! demand and receive those by reference. Collaborators (request dispatch,
//! editors, save hooks) talk to the core through the entry points here and
//! never reach into component internals.

use anyhow::Result as AnyResult;
use tracing::{debug, info};

use crate::config::SiteConfig;
use crate::db::Database;
use crate::error::Result;
use crate::group::{ObjectId, ObjectKind, TranslationGroups};
use crate::language::{Language, LanguageRegistry, RequestContext};
use crate::links::LinksStrategy;
use crate::resolver::{Caller, CreationRequest, LanguageResolver};
use crate::sync::{ContentStore, SyncEngine};
use crate::terms::{BatchOutcome, TermCloner, TermStore, TermTranslation};

pub struct Site {
    db: Database,
    config: SiteConfig,
    registry: LanguageRegistry,
}

impl Site {
    /// Wire up a site over an already-open database.
    pub fn new(db: Database, config: SiteConfig) -> AnyResult<Self> {
        let registry = LanguageRegistry::load(&db)?;
        info!(languages = registry.list().len(), "site initialized");
        Ok(Self {
            db,
            config,
            registry,
        })
    }

    /// Open the database at `path` and wire up a site.
    pub fn open(path: &str, config: SiteConfig) -> AnyResult<Self> {
        Self::new(Database::new(path)?, config)
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Refresh the registry snapshot after administrative language CRUD.
    pub fn reload_languages(&mut self) -> AnyResult<()> {
        self.registry = LanguageRegistry::load(&self.db)?;
        debug!(languages = self.registry.list().len(), "registry reloaded");
        Ok(())
    }

    /// The configured URL strategy.
    pub fn links(&self) -> LinksStrategy {
        LinksStrategy::from_config(&self.config)
    }

    /// Group manager over this site's store.
    pub fn groups(&self) -> TranslationGroups<'_> {
        TranslationGroups::new(&self.db)
    }

    /// Entry point for the about-to-be-created event: deduce the language
    /// of a new or edited object.
    pub fn language_for_new_content(
        &self,
        request: &CreationRequest,
        caller: &Caller,
        ctx: &RequestContext,
    ) -> Result<Language> {
        let groups = self.groups();
        let resolver = LanguageResolver::new(&self.registry, &groups);
        resolver.resolve_for_creation(request, caller, ctx)
    }

    /// Entry point for inbound request dispatch: bind a language and strip
    /// the URL's language token. The language is `None` only in the
    /// pre-multilingual state.
    pub fn dispatch(&self, url: &str, preferred: Option<&str>) -> (Option<Language>, String) {
        if self.registry.is_empty() {
            return (None, url.to_string());
        }
        let links = self.links();
        let extracted = links.extract_language(&self.registry, url);
        let stripped = links.remove_language(&self.registry, url);

        let groups = self.groups();
        let resolver = LanguageResolver::new(&self.registry, &groups);
        let language = resolver.resolve_for_request(extracted.as_deref(), preferred);
        debug!(url, language = language.as_ref().map(|l| l.slug.as_str()), "dispatched request");
        (language, stripped)
    }

    /// Entry point for the content-saved event: mirror policy fields to
    /// the rest of the object's translation group. Ungrouped objects are
    /// a silent no-op.
    pub fn content_saved(
        &self,
        store: &mut dyn ContentStore,
        kind: ObjectKind,
        object_id: ObjectId,
    ) -> Result<()> {
        let groups = self.groups();
        let engine = SyncEngine::new(&groups, &self.config.sync);
        engine.propagate(store, kind, object_id)
    }

    /// Create or update term translations in `target_lang`.
    pub fn translate_terms(
        &self,
        store: &mut dyn TermStore,
        translations: &[TermTranslation],
        target_lang: &str,
    ) -> BatchOutcome {
        let groups = self.groups();
        let cloner = TermCloner::new(&groups, self.config.link_term_translations);
        cloner.translate_batch(store, translations, target_lang)
    }
}
