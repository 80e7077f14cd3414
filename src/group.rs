//! Translation groups: the {language -> object} mapping per content family.
//!
//! Post groups and term groups are independent structures; an object id
//! belongs to at most one group of its kind, and a language appears at
//! most once per group. Both invariants live in the `translations` table's
//! UNIQUE constraints, and `link` re-checks the slot inside its own
//! transaction so a conflicting concurrent attempt fails with `Conflict`
//! instead of corrupting membership. Retrying an identical `link` is a
//! no-op.

use anyhow::Context;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::db::Database;
use crate::error::{Error, Result};

/// Opaque content object identifier.
pub type ObjectId = i64;

/// Translation group identifier.
pub type GroupId = i64;

/// The two content families with independent group structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Post,
    Term,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Post => "post",
            ObjectKind::Term => "term",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manager over translation-group membership, borrowing the shared store.
pub struct TranslationGroups<'a> {
    db: &'a Database,
}

impl<'a> TranslationGroups<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Attach `object_id` as the `lang` member of `group` (a fresh group
    /// when `group` is `None`).
    ///
    /// Fails with `Conflict` when the slot is held by a different object,
    /// or when `object_id` already belongs to a different group of this
    /// kind (detach first; membership is never moved implicitly). Linking
    /// the same object to the slot it already holds is a no-op, which
    /// makes the operation safe to retry.
    pub fn link(
        &self,
        kind: ObjectKind,
        lang: &str,
        object_id: ObjectId,
        group: Option<GroupId>,
    ) -> Result<GroupId> {
        let mut conn = self.db.lock();
        let tx = conn.transaction().context("Failed to begin transaction")?;

        let existing: Option<(GroupId, String)> = tx
            .query_row(
                "SELECT group_id, lang FROM translations WHERE kind = ?1 AND object_id = ?2",
                params![kind.as_str(), object_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("Failed to look up existing membership")?;

        let target_group = match (group, &existing) {
            (Some(g), _) => g,
            // No group named and the object is already linked: stay put.
            (None, Some((g, _))) => *g,
            (None, None) => {
                let next: GroupId = tx
                    .query_row(
                        "SELECT COALESCE(MAX(group_id), 0) + 1 FROM translations WHERE kind = ?1",
                        params![kind.as_str()],
                        |row| row.get(0),
                    )
                    .context("Failed to allocate group id")?;
                next
            }
        };

        if let Some((current_group, current_lang)) = &existing {
            if *current_group != target_group {
                return Err(Error::Conflict {
                    kind,
                    lang: current_lang.clone(),
                    group: *current_group,
                    held_by: object_id,
                });
            }
            if current_lang == lang {
                return Ok(target_group); // retry of an identical link
            }
        }

        let slot_holder: Option<ObjectId> = tx
            .query_row(
                "SELECT object_id FROM translations
                 WHERE kind = ?1 AND group_id = ?2 AND lang = ?3",
                params![kind.as_str(), target_group, lang],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to check language slot")?;

        if let Some(holder) = slot_holder {
            if holder != object_id {
                return Err(Error::Conflict {
                    kind,
                    lang: lang.to_string(),
                    group: target_group,
                    held_by: holder,
                });
            }
        }

        if existing.is_some() {
            // Same group, new language slot: the member is re-slotted.
            tx.execute(
                "UPDATE translations SET lang = ?1 WHERE kind = ?2 AND object_id = ?3",
                params![lang, kind.as_str(), object_id],
            )
            .context("Failed to re-slot group member")?;
        } else {
            tx.execute(
                "INSERT INTO translations (kind, group_id, lang, object_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    kind.as_str(),
                    target_group,
                    lang,
                    object_id,
                    Utc::now().to_rfc3339()
                ],
            )
            .context("Failed to link group member")?;
        }

        tx.commit().context("Failed to commit link")?;
        debug!(kind = %kind, lang, object_id, group = target_group, "linked translation");
        Ok(target_group)
    }

    /// The translation of `object_id` into `lang`, if one exists. Asking
    /// for the object's own language returns the object itself.
    pub fn get_member(
        &self,
        kind: ObjectKind,
        object_id: ObjectId,
        lang: &str,
    ) -> Result<Option<ObjectId>> {
        let conn = self.db.lock();
        let member = conn
            .query_row(
                "SELECT sibling.object_id
                 FROM translations me
                 JOIN translations sibling
                   ON sibling.kind = me.kind AND sibling.group_id = me.group_id
                 WHERE me.kind = ?1 AND me.object_id = ?2 AND sibling.lang = ?3",
                params![kind.as_str(), object_id, lang],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to resolve group member")?;
        Ok(member)
    }

    /// Full membership snapshot of the object's group, keyed by language.
    /// Empty when the object is not linked to any group.
    pub fn get_group(
        &self,
        kind: ObjectKind,
        object_id: ObjectId,
    ) -> Result<BTreeMap<String, ObjectId>> {
        let conn = self.db.lock();
        let mut stmt = conn
            .prepare(
                "SELECT sibling.lang, sibling.object_id
                 FROM translations me
                 JOIN translations sibling
                   ON sibling.kind = me.kind AND sibling.group_id = me.group_id
                 WHERE me.kind = ?1 AND me.object_id = ?2",
            )
            .context("Failed to prepare group snapshot")?;

        let members = stmt
            .query_map(params![kind.as_str(), object_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, ObjectId>(1)?))
            })
            .context("Failed to read group snapshot")?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()
            .context("Failed to collect group snapshot")?;

        Ok(members)
    }

    /// The group the object belongs to, if any.
    pub fn group_of(&self, kind: ObjectKind, object_id: ObjectId) -> Result<Option<GroupId>> {
        let conn = self.db.lock();
        let group = conn
            .query_row(
                "SELECT group_id FROM translations WHERE kind = ?1 AND object_id = ?2",
                params![kind.as_str(), object_id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up group")?;
        Ok(group)
    }

    /// The language slot the object occupies, if it is linked at all.
    pub fn language_of(&self, kind: ObjectKind, object_id: ObjectId) -> Result<Option<String>> {
        let conn = self.db.lock();
        let lang = conn
            .query_row(
                "SELECT lang FROM translations WHERE kind = ?1 AND object_id = ?2",
                params![kind.as_str(), object_id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up member language")?;
        Ok(lang)
    }

    /// Remove the object from its group. The group itself is nothing but
    /// its member rows, so removing the last member deletes the group.
    pub fn detach(&self, kind: ObjectKind, object_id: ObjectId) -> Result<()> {
        let conn = self.db.lock();
        let removed = conn
            .execute(
                "DELETE FROM translations WHERE kind = ?1 AND object_id = ?2",
                params![kind.as_str(), object_id],
            )
            .context("Failed to detach group member")?;
        if removed > 0 {
            debug!(kind = %kind, object_id, "detached translation");
        }
        Ok(())
    }
}
