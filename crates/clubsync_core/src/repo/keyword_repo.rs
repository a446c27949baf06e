//! Language, keyword and keyword-translation persistence.

use super::sqlite_store::{bool_to_int, int_to_bool};
use super::{EntityStore, RepoError, RepoResult, SqliteRosterStore};
use crate::model::identity::EntityKind;
use crate::model::keyword::{Keyword, Language, LocalizedKeyword, LocalizedKeywordKey};
use rusqlite::params;

fn not_found(kind: EntityKind, key: impl Into<String>) -> RepoError {
    RepoError::NotFound {
        kind,
        key: key.into(),
    }
}

impl EntityStore<Language> for SqliteRosterStore<'_> {
    fn lookup(&self, key: &String) -> RepoResult<Vec<Language>> {
        let mut stmt = self
            .conn
            .prepare("SELECT iso_code, name FROM languages WHERE iso_code = ?1;")?;
        let mut rows = stmt.query([key.as_str()])?;
        let mut found = Vec::new();
        while let Some(row) = rows.next()? {
            found.push(Language {
                iso_code: row.get("iso_code")?,
                name: row.get("name")?,
            });
        }
        Ok(found)
    }

    fn insert(&self, language: &Language) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO languages (iso_code, name) VALUES (?1, ?2);",
            params![language.iso_code, language.name],
        )?;
        Ok(())
    }

    fn update(&self, language: &Language) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE languages SET name = ?1 WHERE iso_code = ?2;",
            params![language.name, language.iso_code],
        )?;
        if changed == 0 {
            return Err(not_found(EntityKind::Language, language.iso_code.as_str()));
        }
        Ok(())
    }

    fn delete(&self, language: &Language) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM languages WHERE iso_code = ?1;",
            [language.iso_code.as_str()],
        )?;
        if changed == 0 {
            return Err(not_found(EntityKind::Language, language.iso_code.as_str()));
        }
        Ok(())
    }
}

impl EntityStore<Keyword> for SqliteRosterStore<'_> {
    fn lookup(&self, key: &String) -> RepoResult<Vec<Keyword>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, is_standard FROM keywords WHERE id = ?1;")?;
        let mut rows = stmt.query([key.as_str()])?;
        let mut found = Vec::new();
        while let Some(row) = rows.next()? {
            found.push(Keyword {
                id: row.get("id")?,
                is_standard: int_to_bool(row.get("is_standard")?, "keywords.is_standard")?,
            });
        }
        Ok(found)
    }

    fn insert(&self, keyword: &Keyword) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO keywords (id, is_standard) VALUES (?1, ?2);",
            params![keyword.id, bool_to_int(keyword.is_standard)],
        )?;
        Ok(())
    }

    fn update(&self, keyword: &Keyword) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE keywords SET is_standard = ?1 WHERE id = ?2;",
            params![bool_to_int(keyword.is_standard), keyword.id],
        )?;
        if changed == 0 {
            return Err(not_found(EntityKind::Keyword, keyword.id.as_str()));
        }
        Ok(())
    }

    /// Translations of the keyword are removed by `ON DELETE CASCADE`.
    fn delete(&self, keyword: &Keyword) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM keywords WHERE id = ?1;", [keyword.id.as_str()])?;
        if changed == 0 {
            return Err(not_found(EntityKind::Keyword, keyword.id.as_str()));
        }
        Ok(())
    }
}

impl EntityStore<LocalizedKeyword> for SqliteRosterStore<'_> {
    fn lookup(&self, key: &LocalizedKeywordKey) -> RepoResult<Vec<LocalizedKeyword>> {
        let mut stmt = self.conn.prepare(
            "SELECT keyword_id, language_code, name, usage
             FROM localized_keywords
             WHERE keyword_id = ?1 AND language_code = ?2;",
        )?;
        let mut rows = stmt.query(params![key.keyword_id, key.language_code])?;
        let mut found = Vec::new();
        while let Some(row) = rows.next()? {
            found.push(LocalizedKeyword {
                key: LocalizedKeywordKey {
                    keyword_id: row.get("keyword_id")?,
                    language_code: row.get("language_code")?,
                },
                name: row.get("name")?,
                usage: row.get("usage")?,
            });
        }
        Ok(found)
    }

    fn insert(&self, localized: &LocalizedKeyword) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO localized_keywords (keyword_id, language_code, name, usage)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                localized.key.keyword_id,
                localized.key.language_code,
                localized.name,
                localized.usage,
            ],
        )?;
        Ok(())
    }

    fn update(&self, localized: &LocalizedKeyword) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE localized_keywords
             SET name = ?1, usage = ?2
             WHERE keyword_id = ?3 AND language_code = ?4;",
            params![
                localized.name,
                localized.usage,
                localized.key.keyword_id,
                localized.key.language_code,
            ],
        )?;
        if changed == 0 {
            return Err(not_found(
                EntityKind::LocalizedKeyword,
                format!("{}/{}", localized.key.keyword_id, localized.key.language_code),
            ));
        }
        Ok(())
    }

    fn delete(&self, localized: &LocalizedKeyword) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM localized_keywords WHERE keyword_id = ?1 AND language_code = ?2;",
            params![localized.key.keyword_id, localized.key.language_code],
        )?;
        if changed == 0 {
            return Err(not_found(
                EntityKind::LocalizedKeyword,
                format!("{}/{}", localized.key.keyword_id, localized.key.language_code),
            ));
        }
        Ok(())
    }
}
