use anyhow::{bail, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::language::Language;

/// SQLite-backed store for language definitions and translation groups.
///
/// The connection is shared behind a mutex; every operation locks, runs to
/// completion, and unlocks before returning. Group membership invariants
/// are enforced by UNIQUE constraints so a conflicting concurrent write
/// fails cleanly instead of corrupting membership.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database at the given path and ensure the schema.
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open database at {}", database_path))?;
        Self::create_tables(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (tests and throwaway setups).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::create_tables(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn create_tables(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS languages (
                slug TEXT PRIMARY KEY,
                locale TEXT NOT NULL,
                position INTEGER NOT NULL DEFAULT 0,
                is_default INTEGER NOT NULL DEFAULT 0,
                flag TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create languages table")?;

        // One row per (group, language) member. The UNIQUE constraints carry
        // the group invariants: one member per language per group, one group
        // per object per kind.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS translations (
                kind TEXT NOT NULL,
                group_id INTEGER NOT NULL,
                lang TEXT NOT NULL,
                object_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(kind, group_id, lang),
                UNIQUE(kind, object_id)
            )",
            [],
        )
        .context("Failed to create translations table")?;

        Ok(())
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ==================== Language CRUD ====================

    /// Add a language. The first language added becomes the default.
    pub fn add_language(
        &self,
        slug: &str,
        locale: &str,
        position: i64,
        flag: Option<&str>,
    ) -> Result<()> {
        if slug.is_empty() {
            bail!("Language slug must not be empty");
        }
        let conn = self.lock();
        let now = Utc::now().to_rfc3339();

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM languages", [], |row| row.get(0))?;
        let is_default = i64::from(count == 0);

        conn.execute(
            "INSERT INTO languages (slug, locale, position, is_default, flag, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![slug, locale, position, is_default, flag, now],
        )
        .context(format!("Failed to add language '{}'", slug))?;

        Ok(())
    }

    /// Update locale, position, and flag of an existing language.
    pub fn update_language(
        &self,
        slug: &str,
        locale: &str,
        position: i64,
        flag: Option<&str>,
    ) -> Result<bool> {
        let conn = self.lock();
        let rows = conn
            .execute(
                "UPDATE languages SET locale = ?1, position = ?2, flag = ?3 WHERE slug = ?4",
                params![locale, position, flag, slug],
            )
            .context(format!("Failed to update language '{}'", slug))?;
        Ok(rows > 0)
    }

    /// Switch the default language. The old default is cleared and the new
    /// one set inside a single transaction.
    pub fn set_default_language(&self, slug: &str) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT COUNT(*) FROM languages WHERE slug = ?1",
            params![slug],
            |row| row.get::<_, i64>(0).map(|c| c > 0),
        )?;
        if !exists {
            bail!("Cannot set unknown language '{}' as default", slug);
        }

        tx.execute(
            "UPDATE languages SET is_default = 0 WHERE is_default = 1",
            [],
        )?;
        tx.execute(
            "UPDATE languages SET is_default = 1 WHERE slug = ?1",
            params![slug],
        )?;
        tx.commit().context("Failed to switch default language")?;
        Ok(())
    }

    /// Delete a language. Content in that language is kept and its
    /// translation-group rows are left orphaned (no cascade). If the
    /// deleted language was the default, the first remaining language by
    /// position is promoted so exactly one default survives.
    pub fn delete_language(&self, slug: &str) -> Result<bool> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let was_default: Option<bool> = tx
            .query_row(
                "SELECT is_default FROM languages WHERE slug = ?1",
                params![slug],
                |row| row.get::<_, i64>(0).map(|v| v != 0),
            )
            .optional()?;

        let Some(was_default) = was_default else {
            return Ok(false);
        };

        tx.execute("DELETE FROM languages WHERE slug = ?1", params![slug])
            .context(format!("Failed to delete language '{}'", slug))?;

        if was_default {
            let next: Option<String> = tx
                .query_row(
                    "SELECT slug FROM languages ORDER BY position, slug LIMIT 1",
                    [],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(next_slug) = next {
                tx.execute(
                    "UPDATE languages SET is_default = 1 WHERE slug = ?1",
                    params![next_slug],
                )?;
            }
        }

        tx.commit().context("Failed to delete language")?;
        Ok(true)
    }

    /// Load all languages ordered by position, then slug.
    pub fn list_languages(&self) -> Result<Vec<Language>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT slug, locale, position, is_default, flag
             FROM languages
             ORDER BY position, slug",
        )?;

        let languages = stmt
            .query_map([], |row| {
                Ok(Language {
                    slug: row.get(0)?,
                    locale: row.get(1)?,
                    order: row.get(2)?,
                    is_default: row.get::<_, i64>(3)? != 0,
                    flag: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(languages)
    }
}
