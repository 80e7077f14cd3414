//! Term translation cloning: create or update the translated counterpart
//! of a taxonomy term.
//!
//! Supplied translations may leave any of name/description/slug empty, in
//! which case the source value is reused (and the slug derived from the
//! name on creation). Existing translations are only written when a value
//! actually changes. Batch calls process every term even when siblings
//! fail, and a second pass re-links structural parents through the group
//! manager, skipping parents without a translation in the target language.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::group::{ObjectId, ObjectKind, TranslationGroups};

/// A taxonomy term as seen through the collaborator seam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: ObjectId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent: Option<ObjectId>,
}

/// Payload for creating a term in a target language.
#[derive(Debug, Clone)]
pub struct NewTerm {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub language: String,
}

/// Collaborator seam for taxonomy storage.
pub trait TermStore {
    fn get_term(&self, id: ObjectId) -> anyhow::Result<Option<Term>>;
    fn create_term(&mut self, term: NewTerm) -> anyhow::Result<ObjectId>;
    fn update_term(
        &mut self,
        id: ObjectId,
        name: &str,
        slug: &str,
        description: &str,
    ) -> anyhow::Result<()>;
    fn set_term_parent(&mut self, id: ObjectId, parent: Option<ObjectId>) -> anyhow::Result<()>;
}

/// Translated field values for one source term. Empty strings count as
/// absent: the source value is reused.
#[derive(Debug, Clone)]
pub struct TermTranslation {
    pub source: ObjectId,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

impl TermTranslation {
    pub fn new(source: ObjectId) -> Self {
        Self {
            source,
            name: None,
            slug: None,
            description: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_empty(self.name.as_deref()).unwrap_or(fallback)
    }

    fn description_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_empty(self.description.as_deref()).unwrap_or(fallback)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Outcome of a batch translation call: processed pairs and per-item
/// failures, in input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// (source term, its translation in the target language)
    pub processed: Vec<(ObjectId, ObjectId)>,
    /// (source term, what went wrong)
    pub failures: Vec<(ObjectId, Error)>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The translation produced for a given source term, if any.
    pub fn translation_of(&self, source: ObjectId) -> Option<ObjectId> {
        self.processed
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, t)| *t)
    }
}

/// Creates or updates translated counterparts of taxonomy terms.
pub struct TermCloner<'a> {
    groups: &'a TranslationGroups<'a>,
    link_translations: bool,
}

impl<'a> TermCloner<'a> {
    pub fn new(groups: &'a TranslationGroups<'a>, link_translations: bool) -> Self {
        Self {
            groups,
            link_translations,
        }
    }

    /// Translate a single term; create-or-update plus parent re-linking.
    pub fn translate(
        &self,
        store: &mut dyn TermStore,
        translation: &TermTranslation,
        target_lang: &str,
    ) -> Result<ObjectId> {
        let mut outcome = self.translate_batch(store, std::slice::from_ref(translation), target_lang);
        if let Some((_, err)) = outcome.failures.pop() {
            return Err(err);
        }
        // One input, no failure: exactly one processed pair.
        Ok(outcome.processed[0].1)
    }

    /// Translate a batch of terms into `target_lang`. A failing term never
    /// aborts its siblings; the outcome reports both lists.
    pub fn translate_batch(
        &self,
        store: &mut dyn TermStore,
        translations: &[TermTranslation],
        target_lang: &str,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for translation in translations {
            match self.translate_one(store, translation, target_lang) {
                Ok(target_id) => outcome.processed.push((translation.source, target_id)),
                Err(err) => {
                    warn!(source = translation.source, error = %err, "term translation failed");
                    outcome.failures.push((translation.source, err));
                }
            }
        }

        // Parent pass over everything that was processed.
        for (source_id, target_id) in outcome.processed.clone() {
            if let Err(err) = self.relink_parent(store, source_id, target_id, target_lang) {
                warn!(source = source_id, error = %err, "parent re-link failed");
                outcome.failures.push((source_id, err));
            }
        }

        outcome
    }

    fn translate_one(
        &self,
        store: &mut dyn TermStore,
        translation: &TermTranslation,
        target_lang: &str,
    ) -> Result<ObjectId> {
        let source = store
            .get_term(translation.source)
            .map_err(Error::Storage)?
            .ok_or_else(|| Error::not_found(format!("source term {}", translation.source)))?;

        let existing = self
            .groups
            .get_member(ObjectKind::Term, translation.source, target_lang)?;

        let name = translation.name_or(&source.name);
        let description = translation.description_or(&source.description);

        match existing {
            Some(target_id) => {
                let target = store
                    .get_term(target_id)
                    .map_err(Error::Storage)?
                    .ok_or_else(|| Error::not_found(format!("term translation {}", target_id)))?;

                // A supplied slug replaces the target's; otherwise the
                // target keeps the slug it already has.
                let slug = non_empty(translation.slug.as_deref()).unwrap_or(&target.slug);

                if target.name != name || target.slug != slug || target.description != description {
                    store
                        .update_term(target_id, name, slug, description)
                        .map_err(|e| {
                            Error::Storage(e.context(format!(
                                "Failed to update translation of term {}",
                                translation.source
                            )))
                        })?;
                    debug!(source = translation.source, target = target_id, "updated term translation");
                }
                Ok(target_id)
            }
            None => {
                let slug = non_empty(translation.slug.as_deref())
                    .map(str::to_string)
                    .unwrap_or_else(|| slugify(name));

                let target_id = store
                    .create_term(NewTerm {
                        name: name.to_string(),
                        slug,
                        description: description.to_string(),
                        language: target_lang.to_string(),
                    })
                    .map_err(|e| {
                        Error::Storage(e.context(format!(
                            "Failed to create translation of term {}",
                            translation.source
                        )))
                    })?;

                if self.link_translations {
                    match self.groups.group_of(ObjectKind::Term, translation.source)? {
                        Some(group) => {
                            self.groups
                                .link(ObjectKind::Term, target_lang, target_id, Some(group))?;
                        }
                        // The source's own language is unknown when it was
                        // never linked; the clone stays unlinked too.
                        None => warn!(
                            source = translation.source,
                            "source term has no translation group; clone left unlinked"
                        ),
                    }
                }

                debug!(source = translation.source, target = target_id, lang = target_lang, "created term translation");
                Ok(target_id)
            }
        }
    }

    /// Point the translation at the translated parent, when there is one.
    fn relink_parent(
        &self,
        store: &mut dyn TermStore,
        source_id: ObjectId,
        target_id: ObjectId,
        target_lang: &str,
    ) -> Result<()> {
        let source = store
            .get_term(source_id)
            .map_err(Error::Storage)?
            .ok_or_else(|| Error::not_found(format!("source term {}", source_id)))?;

        let Some(parent) = source.parent else {
            return Ok(());
        };
        let Some(translated_parent) = self
            .groups
            .get_member(ObjectKind::Term, parent, target_lang)?
        else {
            return Ok(()); // parent untranslated: skip, never cross-link
        };

        store
            .set_term_parent(target_id, Some(translated_parent))
            .map_err(Error::Storage)?;
        Ok(())
    }
}

static SLUG_REGEX: OnceLock<Regex> = OnceLock::new();

/// Derive a slug from a name: lowercase, alphanumeric runs joined by `-`.
pub fn slugify(name: &str) -> String {
    let regex = SLUG_REGEX.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap());
    regex
        .replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}
