//! Synchronization engine: mirrors configured fields across a translation
//! group after a member is written.
//!
//! Plain fields are copied verbatim. Two fields are translated instead of
//! copied: the hierarchy parent becomes the parent's translation in the
//! target language (unset when none exists), and taxonomy assignments are
//! mapped term by term, dropping untranslated terms so no cross-language
//! reference ever lands on a target. Writes are compare-first, so running
//! the engine twice over an unchanged source touches nothing. A failing
//! target never stops propagation to the remaining members; failures come
//! back together in `Error::PartialPropagation`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, warn};

use crate::error::{Error, PropagationFailure, Result};
use crate::group::{ObjectId, ObjectKind, TranslationGroups};

/// A field the synchronization policy can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncField {
    /// Hierarchy parent (translated, not copied)
    Parent,
    /// Taxonomy assignments (translated term by term)
    Taxonomies,
    /// Sticky flag
    Sticky,
    /// Publication date
    PublishedAt,
    /// Page template
    Template,
    /// Display order
    MenuOrder,
    /// Thumbnail reference
    Thumbnail,
    /// Comment status
    CommentStatus,
    /// Ping status
    PingStatus,
}

/// The configured set of synchronized fields. Configuration-owned; the
/// engine reads it on every propagate cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPolicy {
    pub fields: BTreeSet<SyncField>,
    /// Custom-field keys mirrored verbatim
    pub custom_fields: BTreeSet<String>,
}

impl SyncPolicy {
    /// Enable a built-in field.
    pub fn with_field(mut self, field: SyncField) -> Self {
        self.fields.insert(field);
        self
    }

    /// Enable a custom-field key.
    pub fn with_custom_field(mut self, key: impl Into<String>) -> Self {
        self.custom_fields.insert(key.into());
        self
    }

    /// Whether a built-in field is enabled.
    pub fn includes(&self, field: &SyncField) -> bool {
        self.fields.contains(field)
    }

    /// Nothing to mirror at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.custom_fields.is_empty()
    }

    fn field_keys(&self) -> Vec<FieldKey> {
        self.fields
            .iter()
            .map(|f| FieldKey::Builtin(*f))
            .chain(self.custom_fields.iter().cloned().map(FieldKey::Custom))
            .collect()
    }
}

/// Address of a single mirrored field on an object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Builtin(SyncField),
    Custom(String),
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Builtin(field) => write!(f, "{:?}", field),
            FieldKey::Custom(key) => write!(f, "custom:{}", key),
        }
    }
}

/// Value of a mirrored field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Id(ObjectId),
    IdSet(Vec<ObjectId>),
    Flag(bool),
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

/// Collaborator seam for object field storage. The core never stores
/// content objects itself; the host application implements this over its
/// own persistence.
pub trait ContentStore {
    /// Current value of a field, `None` when unset.
    fn read_field(
        &self,
        kind: ObjectKind,
        id: ObjectId,
        field: &FieldKey,
    ) -> anyhow::Result<Option<FieldValue>>;

    /// Set (or unset) a field.
    fn write_field(
        &mut self,
        kind: ObjectKind,
        id: ObjectId,
        field: &FieldKey,
        value: Option<FieldValue>,
    ) -> anyhow::Result<()>;

    /// Whether the object carries this field at all. Unsupported fields
    /// are skipped, never written.
    fn supports_field(&self, _kind: ObjectKind, _id: ObjectId, _field: &FieldKey) -> bool {
        true
    }
}

/// Mirrors policy-enabled fields from an edited object to the rest of its
/// translation group.
pub struct SyncEngine<'a> {
    groups: &'a TranslationGroups<'a>,
    policy: &'a SyncPolicy,
}

impl<'a> SyncEngine<'a> {
    pub fn new(groups: &'a TranslationGroups<'a>, policy: &'a SyncPolicy) -> Self {
        Self { groups, policy }
    }

    /// Run one propagate cycle for `source_id` after a successful write.
    ///
    /// Reads the source once, then mirrors to every other group member.
    /// Per-member failures are collected into `PartialPropagation`; the
    /// members that succeeded keep their writes.
    pub fn propagate(
        &self,
        store: &mut dyn ContentStore,
        kind: ObjectKind,
        source_id: ObjectId,
    ) -> Result<()> {
        if self.policy.is_empty() {
            return Ok(());
        }
        let members = self.groups.get_group(kind, source_id)?;
        if members.len() <= 1 {
            return Ok(());
        }

        let keys = self.policy.field_keys();
        let mut source_values = Vec::with_capacity(keys.len());
        for key in keys {
            let value = store
                .read_field(kind, source_id, &key)
                .map_err(|e| e.context(format!("Failed to read source field {}", key)))?;
            source_values.push((key, value));
        }

        let mut failures = Vec::new();
        for (lang, target_id) in &members {
            if *target_id == source_id {
                continue;
            }
            match self.mirror_to(store, kind, *target_id, lang, &source_values) {
                Ok(writes) => {
                    if writes > 0 {
                        debug!(kind = %kind, source_id, target_id, lang, writes, "synchronized fields");
                    }
                }
                Err(e) => {
                    warn!(kind = %kind, source_id, target_id, lang, error = %e, "sync target failed");
                    failures.push(PropagationFailure {
                        object_id: *target_id,
                        reason: format!("{:#}", e),
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::PartialPropagation { failures })
        }
    }

    /// Mirror the snapshot onto one target member; returns the number of
    /// actual writes (zero when the target is already in sync).
    fn mirror_to(
        &self,
        store: &mut dyn ContentStore,
        kind: ObjectKind,
        target_id: ObjectId,
        target_lang: &str,
        source_values: &[(FieldKey, Option<FieldValue>)],
    ) -> anyhow::Result<usize> {
        let mut writes = 0;
        for (key, value) in source_values {
            if !store.supports_field(kind, target_id, key) {
                continue;
            }
            let mirrored = self.translate_value(kind, key, value.as_ref(), target_lang)?;
            let current = store.read_field(kind, target_id, key)?;
            if current != mirrored {
                store.write_field(kind, target_id, key, mirrored)?;
                writes += 1;
            }
        }
        Ok(writes)
    }

    /// Plain fields copy through; `Parent` and `Taxonomies` are resolved
    /// to their translations in the target language.
    fn translate_value(
        &self,
        kind: ObjectKind,
        key: &FieldKey,
        value: Option<&FieldValue>,
        target_lang: &str,
    ) -> anyhow::Result<Option<FieldValue>> {
        match (key, value) {
            (FieldKey::Builtin(SyncField::Parent), Some(FieldValue::Id(parent))) => {
                // The parent of a post is a post, of a term a term.
                let translated = self.groups.get_member(kind, *parent, target_lang)?;
                Ok(translated.map(FieldValue::Id))
            }
            (FieldKey::Builtin(SyncField::Parent), _) => Ok(None),
            (FieldKey::Builtin(SyncField::Taxonomies), Some(FieldValue::IdSet(terms))) => {
                let mut translated = Vec::with_capacity(terms.len());
                for term in terms {
                    if let Some(t) = self.groups.get_member(ObjectKind::Term, *term, target_lang)? {
                        translated.push(t);
                    }
                    // untranslated terms are dropped, never carried across
                }
                translated.sort_unstable();
                Ok(Some(FieldValue::IdSet(translated)))
            }
            (FieldKey::Builtin(SyncField::Taxonomies), _) => Ok(None),
            (_, v) => Ok(v.cloned()),
        }
    }
}
