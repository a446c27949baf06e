//! Person persistence.

use super::sqlite_store::{bool_to_int, int_to_bool, parse_uuid};
use super::{EntityStore, RepoError, RepoResult, SqliteRosterStore};
use crate::model::identity::{EntityKind, PersonId, PersonIdentity};
use crate::model::person::Person;
use rusqlite::{params, Row};

const PERSON_SELECT_SQL: &str = "SELECT
    uuid,
    given_name,
    family_name,
    phone_number,
    email,
    website,
    born_on,
    is_deceased
FROM persons";

impl SqliteRosterStore<'_> {
    /// Loads one person by stable id.
    pub fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }
        Ok(None)
    }
}

impl EntityStore<Person> for SqliteRosterStore<'_> {
    fn lookup(&self, key: &PersonIdentity) -> RepoResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE given_name = ?1 AND family_name = ?2
             ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![key.given_name, key.family_name])?;
        let mut found = Vec::new();
        while let Some(row) = rows.next()? {
            found.push(parse_person_row(row)?);
        }
        Ok(found)
    }

    fn insert(&self, person: &Person) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO persons (
                uuid,
                given_name,
                family_name,
                phone_number,
                email,
                website,
                born_on,
                is_deceased
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                person.uuid.to_string(),
                person.identity.given_name,
                person.identity.family_name,
                person.phone_number,
                person.email,
                person.website,
                person.born_on,
                bool_to_int(person.is_deceased),
            ],
        )?;
        Ok(())
    }

    fn update(&self, person: &Person) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE persons
             SET
                phone_number = ?1,
                email = ?2,
                website = ?3,
                born_on = ?4,
                is_deceased = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6;",
            params![
                person.phone_number,
                person.email,
                person.website,
                person.born_on,
                bool_to_int(person.is_deceased),
                person.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Person,
                key: person.identity.to_string(),
            });
        }
        Ok(())
    }

    /// Memberships of the person are removed by `ON DELETE CASCADE`.
    fn delete(&self, person: &Person) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM persons WHERE uuid = ?1;", [person.uuid.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Person,
                key: person.identity.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Person {
        uuid: parse_uuid(&uuid_text, "persons.uuid")?,
        identity: PersonIdentity {
            given_name: row.get("given_name")?,
            family_name: row.get("family_name")?,
        },
        phone_number: row.get("phone_number")?,
        email: row.get("email")?,
        website: row.get("website")?,
        born_on: row.get("born_on")?,
        is_deceased: int_to_bool(row.get("is_deceased")?, "persons.is_deceased")?,
    })
}
